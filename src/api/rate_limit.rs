// src/api/rate_limit.rs
//! Quota state as reported by the platform's rate-limit headers.
//!
//! Every response carries the window's request ceiling, the requests left
//! in it and, when throttled, how long to wait. The tracker keeps the last
//! value seen for each and is shared by every layer that paces requests.

use crate::constants::{
    RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RETRY_AFTER_HEADER,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use std::str::FromStr;

/// Last-known quota state. Fields stay at their previous value when a
/// response omits the corresponding header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaState {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl QuotaState {
    /// Requests left, never more than the ceiling when both are known.
    pub fn headroom(&self) -> Option<u32> {
        match (self.remaining, self.limit) {
            (Some(remaining), Some(limit)) => Some(remaining.min(limit)),
            (remaining, _) => remaining,
        }
    }
}

/// What a single response said, independent of earlier responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservedQuota {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub retry_after_secs: Option<u64>,
}

/// Shared holder of the latest [`QuotaState`].
///
/// Concurrent deletions race on the update; the last write wins, which is
/// all the pacing logic needs.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    state: Mutex<QuotaState>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one response's headers into the shared state.
    pub fn update(&self, headers: &HeaderMap) -> ObservedQuota {
        self.update_at(headers, Utc::now())
    }

    /// Same as [`update`](Self::update) with an explicit clock reading.
    pub fn update_at(&self, headers: &HeaderMap, now: DateTime<Utc>) -> ObservedQuota {
        let observed = ObservedQuota {
            limit: parse_header(headers, RATE_LIMIT_LIMIT_HEADER),
            remaining: parse_header(headers, RATE_LIMIT_REMAINING_HEADER),
            retry_after_secs: parse_header(headers, RATE_LIMIT_RETRY_AFTER_HEADER),
        };

        let mut state = self.state.lock();
        if let Some(limit) = observed.limit {
            state.limit = Some(limit);
        }
        if let Some(remaining) = observed.remaining {
            state.remaining = Some(remaining);
        }
        if let Some(secs) = observed.retry_after_secs {
            // Out-of-range hints leave the previous reset time alone.
            if let Some(reset_at) = i64::try_from(secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .and_then(|wait| now.checked_add_signed(wait))
            {
                state.reset_at = Some(reset_at);
            }
        }

        observed
    }

    pub fn snapshot(&self) -> QuotaState {
        *self.state.lock()
    }

    pub fn remaining(&self) -> Option<u32> {
        self.state.lock().remaining
    }

    /// True only when the remaining count is known and under `low_water`.
    pub fn is_below(&self, low_water: u32) -> bool {
        self.snapshot()
            .headroom()
            .is_some_and(|left| left < low_water)
    }
}

fn parse_header<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_parse_all_headers() {
        let tracker = RateLimitTracker::new();
        let now = Utc.with_ymd_and_hms(2025, 2, 17, 12, 0, 0).unwrap();

        let observed = tracker.update_at(
            &headers(&[
                ("X-RateLimit-Limit", "100"),
                ("X-RateLimit-Remaining", "95"),
                ("X-RateLimit-Retry-After", "30"),
            ]),
            now,
        );

        assert_eq!(
            observed,
            ObservedQuota {
                limit: Some(100),
                remaining: Some(95),
                retry_after_secs: Some(30),
            }
        );
        let state = tracker.snapshot();
        assert_eq!(state.limit, Some(100));
        assert_eq!(state.remaining, Some(95));
        assert_eq!(state.reset_at, Some(now + chrono::Duration::seconds(30)));
    }

    #[test]
    fn test_missing_headers_keep_last_known_values() {
        let tracker = RateLimitTracker::new();
        tracker.update(&headers(&[
            ("x-ratelimit-limit", "50"),
            ("x-ratelimit-remaining", "20"),
        ]));

        let observed = tracker.update(&HeaderMap::new());

        assert_eq!(observed, ObservedQuota::default());
        assert_eq!(tracker.remaining(), Some(20));
        assert_eq!(tracker.snapshot().limit, Some(50));
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let tracker = RateLimitTracker::new();
        tracker.update(&headers(&[("x-ratelimit-remaining", "7")]));

        let observed = tracker.update(&headers(&[
            ("x-ratelimit-limit", "lots"),
            ("x-ratelimit-remaining", "-3"),
            ("x-ratelimit-retry-after", "soon"),
        ]));

        assert_eq!(observed, ObservedQuota::default());
        assert_eq!(tracker.remaining(), Some(7));
        assert_eq!(tracker.snapshot().reset_at, None);
    }

    #[test]
    fn test_remaining_can_grow_after_window_reset() {
        let tracker = RateLimitTracker::new();
        tracker.update(&headers(&[("x-ratelimit-remaining", "1")]));
        tracker.update(&headers(&[("x-ratelimit-remaining", " 100 ")]));
        assert_eq!(tracker.remaining(), Some(100));
    }

    #[test]
    fn test_is_below_requires_known_remaining() {
        let tracker = RateLimitTracker::new();
        assert!(!tracker.is_below(10));

        tracker.update(&headers(&[("x-ratelimit-remaining", "9")]));
        assert!(tracker.is_below(10));

        tracker.update(&headers(&[("x-ratelimit-remaining", "10")]));
        assert!(!tracker.is_below(10));
    }

    #[test]
    fn test_headroom_is_clamped_to_limit() {
        let state = QuotaState {
            limit: Some(5),
            remaining: Some(8),
            reset_at: None,
        };
        assert_eq!(state.headroom(), Some(5));
        assert_eq!(QuotaState::default().headroom(), None);
    }
}
