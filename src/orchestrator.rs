// src/orchestrator.rs
//! The run state machine: authenticate, collect the catalog, process each
//! video in order, summarize.
//!
//! Failures while handling one video stay with that video. Only
//! authentication and catalog collection can end a run early with an error.

use crate::api::{
    AdaptiveThrottle, BatchDeleter, HttpTransport, PaginatedCollector, PlatformClient,
    RateLimitTracker, RetryingExecutor, Sleeper, StopSignal, TokioSleeper, VideoCatalog,
};
use crate::config::RunConfig;
use crate::constants::{PER_VIDEO_ESCALATION, PER_VIDEO_PAUSE};
use crate::error::AppError;
use crate::events::{LogObserver, RunEvent, RunObserver};
use crate::model::{CaptionTrack, Video};
use crate::types::AccessToken;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Where a run is in its lifecycle. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Unauthenticated,
    Authenticated,
    CollectingParents,
    ProcessingParents,
    Summarized,
}

/// Authoritative counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub videos_processed: usize,
    /// Videos with at least one caption track selected for deletion.
    pub videos_with_captions: usize,
    pub captions_found: usize,
    pub captions_deleted: usize,
    pub videos_failed: usize,
    pub deletions_failed: usize,
}

impl RunStats {
    fn record(&mut self, result: &VideoResult) {
        self.videos_processed += 1;
        if result.found > 0 {
            self.videos_with_captions += 1;
        }
        self.captions_found += result.found;
        self.captions_deleted += result.deleted;
        self.deletions_failed += result.failed_deletions;
        if result.failed {
            self.videos_failed += 1;
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Videos processed:      {}", self.videos_processed)?;
        writeln!(f, "Videos with captions:  {}", self.videos_with_captions)?;
        writeln!(f, "Captions found:        {}", self.captions_found)?;
        write!(f, "Captions deleted:      {}", self.captions_deleted)?;
        if self.videos_failed > 0 || self.deletions_failed > 0 {
            writeln!(f)?;
            writeln!(f, "Videos failed:         {}", self.videos_failed)?;
            write!(f, "Deletions failed:      {}", self.deletions_failed)?;
        }
        Ok(())
    }
}

/// What a finished run hands back to its caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub stats: RunStats,
    /// The stop signal ended the run before every video was handled.
    pub interrupted: bool,
    pub dry_run: bool,
}

impl RunReport {
    /// Summary printed once a run has reached [`RunPhase::Summarized`].
    pub fn summary(&self) -> String {
        let heading = if self.dry_run {
            "📊 Summary (dry run, nothing deleted)"
        } else {
            "📊 Summary"
        };
        let mut text = format!("{}\n{}", heading, self.stats);
        if self.interrupted {
            text.push_str("\n⚠️  Run was interrupted before every video was processed.");
        }
        text
    }

    /// Summary printed when a run fails before its first video.
    pub fn aborted_summary(error: &AppError) -> String {
        format!(
            "📊 Summary (run aborted, no videos were touched)\n{}\n❌ {}",
            RunStats::default(),
            error
        )
    }
}

/// Per-video contribution to [`RunStats`].
#[derive(Debug, Default)]
struct VideoResult {
    found: usize,
    deleted: usize,
    failed_deletions: usize,
    failed: bool,
    stopped_early: bool,
}

pub struct RunOrchestrator {
    catalog: Arc<dyn VideoCatalog>,
    config: RunConfig,
    tracker: Arc<RateLimitTracker>,
    sleeper: Arc<dyn Sleeper>,
    observer: Arc<dyn RunObserver>,
    stop: StopSignal,
    phase: RunPhase,
    run_id: Uuid,
}

impl RunOrchestrator {
    /// `tracker` must be the same one the catalog's executor updates.
    pub fn new(
        catalog: Arc<dyn VideoCatalog>,
        config: &RunConfig,
        tracker: Arc<RateLimitTracker>,
    ) -> Self {
        Self {
            catalog,
            config: config.clone(),
            tracker,
            sleeper: Arc::new(TokioSleeper),
            observer: Arc::new(LogObserver),
            stop: StopSignal::new(),
            phase: RunPhase::Unauthenticated,
            run_id: Uuid::new_v4(),
        }
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Drives the run to [`RunPhase::Summarized`].
    ///
    /// Returns `Err` only when authentication or catalog collection fails;
    /// in that case no video has been touched.
    pub async fn run(&mut self) -> Result<RunReport, AppError> {
        log::info!(
            "Run {} starting against {}{}",
            self.run_id,
            self.config.base_url,
            if self.config.dry_run { " (dry run)" } else { "" }
        );

        let token = self.catalog.authenticate(&self.config.api_key).await?;
        self.advance(RunPhase::Authenticated);

        self.advance(RunPhase::CollectingParents);
        let throttle = AdaptiveThrottle::new(
            self.tracker.clone(),
            self.sleeper.clone(),
            self.config.low_water_mark,
        );
        let videos = self.collect_videos(&token, &throttle).await?;
        log::info!("Run {}: {} video(s) to process", self.run_id, videos.len());

        self.advance(RunPhase::ProcessingParents);
        let deleter = BatchDeleter::new(
            self.config.chunk_policy,
            throttle.clone(),
            self.observer.clone(),
            self.stop.clone(),
        );

        let mut stats = RunStats::default();
        let mut interrupted = false;
        let total = videos.len();

        for (index, video) in videos.iter().enumerate() {
            if self.stop.is_triggered() {
                self.observer.observe(RunEvent::StopRequested);
                interrupted = true;
                break;
            }
            if index > 0 {
                throttle.delay(PER_VIDEO_PAUSE, PER_VIDEO_ESCALATION).await;
            }

            self.observer.observe(RunEvent::VideoStarted {
                index: index + 1,
                total,
                video_id: video.id.to_string(),
                title: video.display_title().to_string(),
            });

            let result = self.process_video(&token, video, &deleter).await;
            interrupted |= result.stopped_early;
            stats.record(&result);
        }

        if interrupted && stats.videos_processed < total {
            log::warn!(
                "Run {} stopped with {} video(s) untouched",
                self.run_id,
                total - stats.videos_processed
            );
        }

        self.advance(RunPhase::Summarized);
        self.observer.observe(RunEvent::Finished { stats });

        Ok(RunReport {
            run_id: self.run_id,
            stats,
            interrupted,
            dry_run: self.config.dry_run,
        })
    }

    async fn collect_videos(
        &self,
        token: &AccessToken,
        throttle: &AdaptiveThrottle,
    ) -> Result<Vec<Video>, AppError> {
        let collector = PaginatedCollector::new(throttle.clone(), self.observer.clone());
        let catalog: &dyn VideoCatalog = self.catalog.as_ref();
        let page_size = self.config.page_size;

        collector
            .collect_all(move |page| catalog.fetch_video_page(token, page, page_size))
            .await
    }

    /// Discovers and deletes one video's captions. Never fails the run.
    async fn process_video(
        &self,
        token: &AccessToken,
        video: &Video,
        deleter: &BatchDeleter,
    ) -> VideoResult {
        let tracks = match self.catalog.list_captions(token, &video.id).await {
            Ok(tracks) => tracks,
            Err(error) => {
                self.observer.observe(RunEvent::VideoFailed {
                    video_id: video.id.to_string(),
                    reason: error.to_string(),
                });
                return VideoResult {
                    failed: true,
                    ..VideoResult::default()
                };
            }
        };

        let selected: Vec<CaptionTrack> = tracks
            .iter()
            .filter(|track| self.config.languages.accepts(track))
            .cloned()
            .collect();

        self.observer.observe(RunEvent::CaptionsDiscovered {
            video_id: video.id.to_string(),
            found: tracks.len(),
            selected: selected.len(),
        });

        let found = selected.len();
        if found == 0 || self.config.dry_run {
            return VideoResult {
                found,
                ..VideoResult::default()
            };
        }

        let outcome = deleter
            .delete_all(video.id.as_str(), &selected, |track: &CaptionTrack| {
                let catalog = Arc::clone(&self.catalog);
                let token = token.clone();
                let video_id = video.id.clone();
                let language = track.language.clone();
                async move { catalog.delete_caption(&token, &video_id, &language).await }
            })
            .await;

        match outcome {
            Ok(outcome) => VideoResult {
                found,
                deleted: outcome.deleted,
                failed_deletions: outcome.failed,
                failed: false,
                stopped_early: outcome.stopped_early,
            },
            Err(AppError::BatchAborted { deleted, source }) => {
                self.observer.observe(RunEvent::VideoFailed {
                    video_id: video.id.to_string(),
                    reason: source.to_string(),
                });
                VideoResult {
                    found,
                    deleted,
                    failed_deletions: found - deleted,
                    failed: true,
                    stopped_early: false,
                }
            }
            Err(error) => {
                self.observer.observe(RunEvent::VideoFailed {
                    video_id: video.id.to_string(),
                    reason: error.to_string(),
                });
                VideoResult {
                    found,
                    failed_deletions: found,
                    failed: true,
                    ..VideoResult::default()
                }
            }
        }
    }

    fn advance(&mut self, to: RunPhase) {
        let from = self.phase;
        self.phase = to;
        self.observer.observe(RunEvent::PhaseChanged { from, to });
    }
}

/// Wires a complete run over one transport: a single quota tracker shared
/// by the executor and the orchestrator's pacing.
pub fn assemble(
    config: &RunConfig,
    transport: Arc<dyn HttpTransport>,
    sleeper: Arc<dyn Sleeper>,
    observer: Arc<dyn RunObserver>,
    stop: StopSignal,
) -> RunOrchestrator {
    let tracker = Arc::new(RateLimitTracker::new());
    let executor = RetryingExecutor::new(transport, tracker.clone())
        .with_sleeper(sleeper.clone())
        .with_observer(observer.clone())
        .with_max_retries(config.max_retries)
        .with_low_water_mark(config.low_water_mark);
    let client = PlatformClient::new(config.base_url.clone(), executor);

    RunOrchestrator::new(Arc::new(client), config, tracker)
        .with_sleeper(sleeper)
        .with_observer(observer)
        .with_stop_signal(stop)
}
