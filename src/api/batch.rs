// src/api/batch.rs
//! Chunked, bounded-concurrency deletion of one video's caption tracks.
//!
//! Small sets go out in a single burst. Larger sets are split into chunks
//! that run one after another, each chunk fully concurrent, with a pause
//! between chunks whenever the quota is running low.

use super::throttle::AdaptiveThrottle;
use crate::constants::{
    ALL_AT_ONCE_THRESHOLD, CHUNK_LOW_QUOTA_PAUSE, DELETION_CHUNK_SIZE, HEAVY_BATCH_THRESHOLD,
    HEAVY_DELETION_CHUNK_SIZE,
};
use crate::error::AppError;
use crate::events::{RunEvent, RunObserver};
use futures::stream::{self, StreamExt};
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How a batch is cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    /// Up to this many items go out in one chunk.
    pub all_at_once_threshold: usize,
    pub chunk_size: usize,
    /// Above this many items, `heavy_chunk_size` is used instead.
    pub heavy_threshold: usize,
    pub heavy_chunk_size: usize,
    /// Pause between chunks while quota is low.
    pub low_quota_pause: Duration,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            all_at_once_threshold: ALL_AT_ONCE_THRESHOLD,
            chunk_size: DELETION_CHUNK_SIZE,
            heavy_threshold: HEAVY_BATCH_THRESHOLD,
            heavy_chunk_size: HEAVY_DELETION_CHUNK_SIZE,
            low_quota_pause: CHUNK_LOW_QUOTA_PAUSE,
        }
    }
}

impl ChunkPolicy {
    /// Chunk size (and parallelism) for a batch of `count` items.
    ///
    /// Heavy batches never run wider than `chunk_size`.
    pub fn chunk_size_for(&self, count: usize) -> usize {
        let size = if count <= self.all_at_once_threshold {
            count
        } else if count <= self.heavy_threshold {
            self.chunk_size
        } else {
            self.heavy_chunk_size.min(self.chunk_size)
        };
        size.max(1)
    }

    /// Sizes of the chunks a batch of `count` items is split into.
    pub fn plan(&self, count: usize) -> Vec<usize> {
        if count == 0 {
            return Vec::new();
        }
        let size = self.chunk_size_for(count);
        let mut sizes = vec![size; count / size];
        if count % size != 0 {
            sizes.push(count % size);
        }
        sizes
    }
}

/// Cooperative early-stop flag, checked at chunk and video boundaries.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened to one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub attempted: usize,
    pub deleted: usize,
    pub failed: usize,
    pub stopped_early: bool,
}

pub struct BatchDeleter {
    policy: ChunkPolicy,
    throttle: AdaptiveThrottle,
    observer: Arc<dyn RunObserver>,
    stop: StopSignal,
}

impl BatchDeleter {
    pub fn new(
        policy: ChunkPolicy,
        throttle: AdaptiveThrottle,
        observer: Arc<dyn RunObserver>,
        stop: StopSignal,
    ) -> Self {
        Self {
            policy,
            throttle,
            observer,
            stop,
        }
    }

    /// Deletes every item through `delete`, returning how many succeeded.
    ///
    /// Individual failures are reported and skipped. Only an error that
    /// [`is_fatal_for_batch`](AppError::is_fatal_for_batch) ends the batch,
    /// after the chunk it occurred in has settled; it comes back wrapped in
    /// [`AppError::BatchAborted`] with the deletions that did go through.
    pub async fn delete_all<C, F, Fut>(
        &self,
        owner: &str,
        children: &[C],
        delete: F,
    ) -> Result<BatchOutcome, AppError>
    where
        C: Display,
        F: Fn(&C) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let mut outcome = BatchOutcome::default();
        if children.is_empty() {
            return Ok(outcome);
        }

        let size = self.policy.chunk_size_for(children.len());
        let chunk_count = children.len().div_ceil(size);

        for (index, chunk) in children.chunks(size).enumerate() {
            if self.stop.is_triggered() {
                log::warn!(
                    "Stopping deletions on {} with {} chunk(s) left",
                    owner,
                    chunk_count - index
                );
                outcome.stopped_early = true;
                break;
            }

            let results: Vec<(&C, Result<(), AppError>)> = stream::iter(chunk)
                .map(|child| {
                    let pending = delete(child);
                    async move { (child, pending.await) }
                })
                .buffer_unordered(chunk.len())
                .collect()
                .await;

            let mut deleted = 0;
            let mut fatal = None;
            for (child, result) in results {
                match result {
                    Ok(()) => deleted += 1,
                    Err(error) => {
                        outcome.failed += 1;
                        self.observer.observe(RunEvent::DeletionFailed {
                            video_id: owner.to_string(),
                            caption: child.to_string(),
                            reason: error.to_string(),
                        });
                        if error.is_fatal_for_batch() && fatal.is_none() {
                            fatal = Some(error);
                        }
                    }
                }
            }

            outcome.attempted += chunk.len();
            outcome.deleted += deleted;
            self.observer.observe(RunEvent::ChunkCompleted {
                video_id: owner.to_string(),
                chunk: index + 1,
                attempted: chunk.len(),
                deleted,
            });

            if let Some(error) = fatal {
                return Err(AppError::BatchAborted {
                    deleted: outcome.deleted,
                    source: Box::new(error),
                });
            }

            if index + 1 < chunk_count {
                self.throttle.pause_if_low(self.policy.low_quota_pause).await;
            }
        }

        Ok(outcome)
    }
}
