// src/api/throttle.rs
//! Pacing between requests based on the last known quota headroom.
//!
//! This only lowers the odds of a 429; the executor's backoff still
//! handles the ones that get through.

use super::rate_limit::RateLimitTracker;
use super::sleeper::Sleeper;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AdaptiveThrottle {
    tracker: Arc<RateLimitTracker>,
    sleeper: Arc<dyn Sleeper>,
    low_water_mark: u32,
}

impl AdaptiveThrottle {
    pub fn new(
        tracker: Arc<RateLimitTracker>,
        sleeper: Arc<dyn Sleeper>,
        low_water_mark: u32,
    ) -> Self {
        Self {
            tracker,
            sleeper,
            low_water_mark,
        }
    }

    pub fn quota_is_low(&self) -> bool {
        self.tracker.is_below(self.low_water_mark)
    }

    /// `base` stretched by `escalation` when quota is low, `base` otherwise.
    pub fn delay_for(&self, base: Duration, escalation: u32) -> Duration {
        if self.quota_is_low() {
            base.saturating_mul(escalation.max(1))
        } else {
            base
        }
    }

    /// Sleeps for [`delay_for`](Self::delay_for).
    pub async fn delay(&self, base: Duration, escalation: u32) {
        let wait = self.delay_for(base, escalation);
        if wait > base {
            log::debug!("Quota low, stretching pause to {:?}", wait);
        }
        self.sleeper.sleep(wait).await;
    }

    /// Sleeps for `pause` only when quota is low. Returns whether it slept.
    pub async fn pause_if_low(&self, pause: Duration) -> bool {
        if !self.quota_is_low() {
            return false;
        }
        self.sleeper.sleep(pause).await;
        true
    }
}
