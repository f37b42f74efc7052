// src/events.rs
//! Progress events emitted by a run, and the sinks that receive them.
//!
//! The engine never prints. It describes what happened as a [`RunEvent`]
//! and hands it to a [`RunObserver`]; the binary wires in [`LogObserver`].

use crate::orchestrator::{RunPhase, RunStats};
use parking_lot::Mutex;
use std::time::Duration;

/// Something worth telling the operator about.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    PhaseChanged {
        from: RunPhase,
        to: RunPhase,
    },
    PageCollected {
        page: u32,
        total_pages: u32,
        items: usize,
    },
    VideoStarted {
        index: usize,
        total: usize,
        video_id: String,
        title: String,
    },
    CaptionsDiscovered {
        video_id: String,
        found: usize,
        selected: usize,
    },
    ChunkCompleted {
        video_id: String,
        chunk: usize,
        attempted: usize,
        deleted: usize,
    },
    DeletionFailed {
        video_id: String,
        caption: String,
        reason: String,
    },
    VideoFailed {
        video_id: String,
        reason: String,
    },
    QuotaLow {
        remaining: u32,
        limit: Option<u32>,
    },
    Throttled {
        url: String,
        attempt: u32,
        wait: Duration,
    },
    TransportRetry {
        url: String,
        attempt: u32,
        wait: Duration,
        reason: String,
    },
    StopRequested,
    Finished {
        stats: RunStats,
    },
}

/// Receives run events. Implementations must return promptly.
pub trait RunObserver: Send + Sync {
    fn observe(&self, event: RunEvent);
}

/// Writes events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn observe(&self, event: RunEvent) {
        match event {
            RunEvent::PhaseChanged { from, to } => {
                log::debug!("Run phase {:?} -> {:?}", from, to);
            }
            RunEvent::PageCollected {
                page,
                total_pages,
                items,
            } => {
                log::info!("📄 Page {}/{}: {} videos", page, total_pages, items);
            }
            RunEvent::VideoStarted {
                index,
                total,
                video_id,
                title,
            } => {
                log::info!("🎬 [{}/{}] {} ({})", index, total, title, video_id);
            }
            RunEvent::CaptionsDiscovered {
                video_id,
                found,
                selected,
            } => {
                if found == selected {
                    log::info!("   {} caption track(s) on {}", found, video_id);
                } else {
                    log::info!(
                        "   {} caption track(s) on {}, {} match the language filter",
                        found,
                        video_id,
                        selected
                    );
                }
            }
            RunEvent::ChunkCompleted {
                video_id,
                chunk,
                attempted,
                deleted,
            } => {
                log::debug!(
                    "   chunk {} on {}: {}/{} deleted",
                    chunk,
                    video_id,
                    deleted,
                    attempted
                );
            }
            RunEvent::DeletionFailed {
                video_id,
                caption,
                reason,
            } => {
                log::warn!("   ✗ could not delete {} on {}: {}", caption, video_id, reason);
            }
            RunEvent::VideoFailed { video_id, reason } => {
                log::error!("   ✗ skipped {}: {}", video_id, reason);
            }
            RunEvent::QuotaLow { remaining, limit } => match limit {
                Some(limit) => log::warn!("⚠️  Quota low: {}/{} requests left", remaining, limit),
                None => log::warn!("⚠️  Quota low: {} requests left", remaining),
            },
            RunEvent::Throttled { url, attempt, wait } => {
                log::warn!(
                    "⏳ Rate limited on {} (attempt {}), waiting {:?}",
                    url,
                    attempt + 1,
                    wait
                );
            }
            RunEvent::TransportRetry {
                url,
                attempt,
                wait,
                reason,
            } => {
                log::warn!(
                    "Request to {} failed (attempt {}): {}; retrying after {:?}",
                    url,
                    attempt + 1,
                    reason,
                    wait
                );
            }
            RunEvent::StopRequested => {
                log::warn!("Stop requested, finishing at the next boundary");
            }
            RunEvent::Finished { stats } => {
                log::info!(
                    "Run finished: {} videos, {} captions deleted",
                    stats.videos_processed,
                    stats.captions_deleted
                );
            }
        }
    }
}

/// Keeps every event in memory. Handy for embedding and for tests.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<RunEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().clone()
    }
}

impl RunObserver for CollectingObserver {
    fn observe(&self, event: RunEvent) {
        self.events.lock().push(event);
    }
}
