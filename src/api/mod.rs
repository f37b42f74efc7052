// src/api/mod.rs
//! Platform API interaction under a request quota.
//!
//! Layers, leaf first: quota tracking and backoff, the retrying executor,
//! pacing, pagination and batched deletion, and the platform client that
//! ties endpoints to all of it.

pub mod backoff;
pub mod batch;
pub mod catalog;
pub mod client;
pub mod executor;
pub mod pagination;
pub mod rate_limit;
mod responses;
pub mod sleeper;
pub mod throttle;

#[cfg(test)]
pub(crate) mod testing;

use crate::error::AppError;
use crate::model::{CaptionTrack, Video};
use crate::types::{AccessToken, ApiKey, LanguageTag, VideoId};

/// The ability to walk a video catalog and remove caption tracks.
///
/// The orchestrator depends on this trait, never on HTTP details.
#[async_trait::async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Exchanges the API key for a token valid for the rest of the run.
    async fn authenticate(&self, api_key: &ApiKey) -> Result<AccessToken, AppError>;

    async fn fetch_video_page(
        &self,
        token: &AccessToken,
        page: u32,
        page_size: u32,
    ) -> Result<PageEnvelope<Video>, AppError>;

    /// Caption tracks on one video. A video with none is an empty list.
    async fn list_captions(
        &self,
        token: &AccessToken,
        video: &VideoId,
    ) -> Result<Vec<CaptionTrack>, AppError>;

    async fn delete_caption(
        &self,
        token: &AccessToken,
        video: &VideoId,
        language: &LanguageTag,
    ) -> Result<(), AppError>;
}

// Re-export the public interface
pub use backoff::BackoffPolicy;
pub use batch::{BatchDeleter, BatchOutcome, ChunkPolicy, StopSignal};
pub use catalog::PlatformClient;
pub use client::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use executor::{RetryOutcome, RetryingExecutor};
pub use pagination::{PageEnvelope, PaginatedCollector};
pub use rate_limit::{ObservedQuota, QuotaState, RateLimitTracker};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
pub use throttle::AdaptiveThrottle;
