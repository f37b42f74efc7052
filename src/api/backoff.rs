// src/api/backoff.rs
//! Exponential backoff as a pure function of the attempt number.

use crate::constants::{MAX_RETRY_HINT, NETWORK_BACKOFF_UNIT, THROTTLED_BACKOFF_UNIT};
use std::time::Duration;

/// Wait schedule for one kind of retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    unit: Duration,
}

impl BackoffPolicy {
    pub const fn new(unit: Duration) -> Self {
        Self { unit }
    }

    /// Schedule for 429 responses: 1s, 2s, 4s, ...
    pub const fn throttling() -> Self {
        Self::new(THROTTLED_BACKOFF_UNIT)
    }

    /// Schedule for dropped connections and timeouts: 100ms, 200ms, 400ms, ...
    pub const fn network() -> Self {
        Self::new(NETWORK_BACKOFF_UNIT)
    }

    /// How long to wait before retrying after attempt `attempt` (0-based).
    ///
    /// A server-provided hint in seconds takes precedence over the schedule,
    /// up to [`MAX_RETRY_HINT`].
    pub fn wait_for(&self, attempt: u32, hint_secs: Option<u64>) -> Duration {
        if let Some(secs) = hint_secs {
            let hint = Duration::from_secs(secs);
            if hint > MAX_RETRY_HINT {
                log::warn!(
                    "Retry hint of {}s exceeds the {}s ceiling; waiting {}s instead",
                    secs,
                    MAX_RETRY_HINT.as_secs(),
                    MAX_RETRY_HINT.as_secs()
                );
                return MAX_RETRY_HINT;
            }
            return hint;
        }
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.unit.saturating_mul(factor)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::throttling()
    }
}
