// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you the story
//! of how a run behaves: how it pages, how hard it backs off, and how
//! much it does at once.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Platform API boundaries
// ---------------------------------------------------------------------------

/// Platform endpoint used when neither the CLI nor the environment names one.
pub const DEFAULT_BASE_URL: &str = "https://ws.api.video";

/// Environment variable holding the platform API key.
pub const API_KEY_ENV_VAR: &str = "CAPTIONSWEEP_API_KEY";

/// Largest page size the catalog listing accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// How many videos to request per page of the catalog listing.
///
/// 100 is the platform maximum; larger pages mean fewer list calls
/// against the quota.
pub const VIDEO_PAGE_SIZE: u32 = 100;

/// Header carrying the request ceiling of the current quota window.
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Header carrying the requests left in the current quota window.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Header carrying the server's retry hint, in seconds.
pub const RATE_LIMIT_RETRY_AFTER_HEADER: &str = "x-ratelimit-retry-after";

// ---------------------------------------------------------------------------
// Quota and retry behavior
// ---------------------------------------------------------------------------

/// Remaining-request count below which the run starts slowing down.
pub const QUOTA_LOW_WATER_MARK: u32 = 10;

/// Retries after the first attempt before a call is given up on.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Backoff unit for 429 responses. Doubles per attempt.
pub const THROTTLED_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Backoff unit for transport failures.
///
/// Much shorter than the 429 unit: a dropped connection says nothing
/// about the quota window.
pub const NETWORK_BACKOFF_UNIT: Duration = Duration::from_millis(100);

/// Longest server retry hint honored as-is; larger hints are clamped.
pub const MAX_RETRY_HINT: Duration = Duration::from_secs(15 * 60);

// ---------------------------------------------------------------------------
// Pacing
// ---------------------------------------------------------------------------

/// Pause between catalog page fetches.
pub const PAGE_FETCH_PAUSE: Duration = Duration::from_millis(200);

/// How much longer page fetches pause when quota is low.
pub const PAGE_FETCH_ESCALATION: u32 = 3;

/// Pause between videos.
pub const PER_VIDEO_PAUSE: Duration = Duration::from_millis(100);

/// How much longer the per-video loop pauses when quota is low.
pub const PER_VIDEO_ESCALATION: u32 = 5;

/// Pause inserted between deletion chunks when quota is low.
pub const CHUNK_LOW_QUOTA_PAUSE: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Deletion batching
// ---------------------------------------------------------------------------

/// Caption counts up to this are deleted in a single concurrent burst.
pub const ALL_AT_ONCE_THRESHOLD: usize = 10;

/// Chunk size for moderately large caption sets.
pub const DELETION_CHUNK_SIZE: usize = 5;

/// Widest chunk `--chunk-size` accepts.
pub const MAX_DELETION_CHUNK_SIZE: usize = 100;

/// Caption counts above this switch to the smaller chunk size.
pub const HEAVY_BATCH_THRESHOLD: usize = 50;

/// Chunk size for very large caption sets.
pub const HEAVY_DELETION_CHUNK_SIZE: usize = 3;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
