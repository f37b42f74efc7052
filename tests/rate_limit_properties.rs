// tests/rate_limit_properties.rs
//! Property tests for quota header interpretation and backoff growth.

use captionsweep::constants::{
    MAX_RETRY_HINT, RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER,
};
use captionsweep::{BackoffPolicy, RateLimitTracker};
use proptest::prelude::*;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            map.insert(name, value);
        }
    }
    map
}

proptest! {
    #[test]
    fn arbitrary_header_values_never_panic(
        limit in ".{0,24}",
        remaining in ".{0,24}",
        retry_after in ".{0,24}",
    ) {
        let tracker = RateLimitTracker::new();
        tracker.update(&headers(&[
            ("x-ratelimit-limit", limit.as_str()),
            ("x-ratelimit-remaining", remaining.as_str()),
            ("x-ratelimit-retry-after", retry_after.as_str()),
        ]));
        let _ = tracker.snapshot();
    }

    #[test]
    fn remaining_is_the_last_value_parsed(values in proptest::collection::vec(any::<u32>(), 1..8)) {
        let tracker = RateLimitTracker::new();
        for value in &values {
            let value = value.to_string();
            tracker.update(&headers(&[(RATE_LIMIT_REMAINING_HEADER, value.as_str())]));
        }
        prop_assert_eq!(tracker.remaining(), values.last().copied());
    }

    #[test]
    fn unparseable_remaining_keeps_the_previous_value(
        first in any::<u32>(),
        junk in "[a-z ]{1,12}",
    ) {
        let tracker = RateLimitTracker::new();
        let first_text = first.to_string();
        tracker.update(&headers(&[(RATE_LIMIT_REMAINING_HEADER, first_text.as_str())]));
        tracker.update(&headers(&[(RATE_LIMIT_REMAINING_HEADER, junk.as_str())]));
        prop_assert_eq!(tracker.remaining(), Some(first));
    }

    #[test]
    fn headroom_never_exceeds_the_limit(limit in any::<u32>(), remaining in any::<u32>()) {
        let tracker = RateLimitTracker::new();
        let (limit_text, remaining_text) = (limit.to_string(), remaining.to_string());
        tracker.update(&headers(&[
            (RATE_LIMIT_LIMIT_HEADER, limit_text.as_str()),
            (RATE_LIMIT_REMAINING_HEADER, remaining_text.as_str()),
        ]));
        if let Some(headroom) = tracker.snapshot().headroom() {
            prop_assert!(headroom <= limit);
        }
    }

    #[test]
    fn backoff_doubles_and_never_shrinks(attempt in 0u32..40, unit_ms in 1u64..2_000) {
        let policy = BackoffPolicy::new(Duration::from_millis(unit_ms));
        let current = policy.wait_for(attempt, None);
        let next = policy.wait_for(attempt + 1, None);
        prop_assert!(next >= current);
        if attempt < 16 {
            prop_assert_eq!(current, Duration::from_millis(unit_ms) * 2u32.pow(attempt));
        }
    }

    #[test]
    fn a_retry_hint_wins_up_to_the_ceiling(attempt in 0u32..10, hint in 0u64..3_600) {
        let policy = BackoffPolicy::throttling();
        prop_assert_eq!(
            policy.wait_for(attempt, Some(hint)),
            Duration::from_secs(hint).min(MAX_RETRY_HINT)
        );
    }

    #[test]
    fn no_hint_waits_past_the_ceiling(attempt in 0u32..10, hint in any::<u64>()) {
        let policy = BackoffPolicy::throttling();
        prop_assert!(policy.wait_for(attempt, Some(hint)) <= MAX_RETRY_HINT);
    }
}
