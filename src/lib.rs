// src/lib.rs
//! captionsweep library: bulk removal of caption tracks from a video
//! catalog under a request quota.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `ValidationError`
//! - **Configuration**: `RunConfig`, `CommandLineInput`
//! - **Domain model**: `Video`, `CaptionTrack`, `LanguageFilter`
//! - **Domain types**: `VideoId`, `LanguageTag`, `ApiKey`, `AccessToken`, `BaseUrl`
//! - **API engine**: `RateLimitTracker`, `BackoffPolicy`, `RetryingExecutor`,
//!   `PaginatedCollector`, `AdaptiveThrottle`, `BatchDeleter`, `PlatformClient`
//! - **Run**: `RunOrchestrator`, `RunReport`, `RunStats`, run events

pub mod api;
pub mod config;
pub mod constants;
mod error;
pub mod events;
pub mod model;
pub mod orchestrator;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, Result};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, RunConfig};

// --- Domain Model ---
pub use crate::model::{CaptionTrack, LanguageFilter, Video};

// --- Domain Types ---
pub use crate::types::{AccessToken, ApiKey, BaseUrl, LanguageTag, VideoId};

// --- API Engine ---
pub use crate::api::{
    AdaptiveThrottle, BackoffPolicy, BatchDeleter, BatchOutcome, ChunkPolicy, HttpRequest,
    HttpResponse, HttpTransport, PageEnvelope, PaginatedCollector, PlatformClient,
    RateLimitTracker, RecordingSleeper, ReqwestTransport, RetryOutcome, RetryingExecutor,
    Sleeper, StopSignal, TokioSleeper, VideoCatalog,
};

// --- Run ---
pub use crate::events::{CollectingObserver, LogObserver, RunEvent, RunObserver};
pub use crate::orchestrator::{assemble, RunOrchestrator, RunPhase, RunReport, RunStats};
