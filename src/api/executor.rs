// src/api/executor.rs
//! Single-call retry with rate-limit awareness.
//!
//! Only two things are retried: transport failures that may go away on
//! their own, and 429 responses. Every other status goes back to the
//! caller untouched, since only the caller knows whether a 404 is fine.

use super::backoff::BackoffPolicy;
use super::client::{HttpRequest, HttpResponse, HttpTransport};
use super::rate_limit::RateLimitTracker;
use super::sleeper::{Sleeper, TokioSleeper};
use crate::constants::{DEFAULT_MAX_RETRIES, QUOTA_LOW_WATER_MARK};
use crate::error::AppError;
use crate::events::{LogObserver, RunEvent, RunObserver};
use reqwest::StatusCode;
use std::sync::Arc;

/// Result of one attempt, before the retry decision.
#[derive(Debug)]
pub enum RetryOutcome {
    Success(HttpResponse),
    Throttled(Option<u64>),
    TransientFailure(AppError),
    FatalFailure(AppError),
}

/// Wraps an [`HttpTransport`] with bounded retry.
#[derive(Clone)]
pub struct RetryingExecutor {
    transport: Arc<dyn HttpTransport>,
    tracker: Arc<RateLimitTracker>,
    sleeper: Arc<dyn Sleeper>,
    observer: Arc<dyn RunObserver>,
    throttling: BackoffPolicy,
    network: BackoffPolicy,
    max_retries: u32,
    low_water_mark: u32,
}

impl RetryingExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>, tracker: Arc<RateLimitTracker>) -> Self {
        Self {
            transport,
            tracker,
            sleeper: Arc::new(TokioSleeper),
            observer: Arc::new(LogObserver),
            throttling: BackoffPolicy::throttling(),
            network: BackoffPolicy::network(),
            max_retries: DEFAULT_MAX_RETRIES,
            low_water_mark: QUOTA_LOW_WATER_MARK,
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
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_low_water_mark(mut self, low_water_mark: u32) -> Self {
        self.low_water_mark = low_water_mark;
        self
    }

    /// Sends `request`, retrying up to `max_retries` times.
    ///
    /// Fails with [`AppError::RetriesExhausted`] once `max_retries + 1`
    /// attempts have all been throttled or hit transient transport errors.
    pub async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, AppError> {
        let mut attempt: u32 = 0;

        loop {
            let last_attempt = attempt >= self.max_retries;

            match self.attempt(request).await {
                RetryOutcome::Success(response) => return Ok(response),
                RetryOutcome::FatalFailure(error) => return Err(error),
                RetryOutcome::Throttled(hint) => {
                    if last_attempt {
                        return Err(self.exhausted(request, attempt, "HTTP 429 Too Many Requests"));
                    }
                    let wait = self.throttling.wait_for(attempt, hint);
                    self.observer.observe(RunEvent::Throttled {
                        url: request.url.clone(),
                        attempt,
                        wait,
                    });
                    self.sleeper.sleep(wait).await;
                }
                RetryOutcome::TransientFailure(error) => {
                    if last_attempt {
                        return Err(self.exhausted(request, attempt, &error.to_string()));
                    }
                    let wait = self.network.wait_for(attempt, None);
                    self.observer.observe(RunEvent::TransportRetry {
                        url: request.url.clone(),
                        attempt,
                        wait,
                        reason: error.to_string(),
                    });
                    self.sleeper.sleep(wait).await;
                }
            }

            attempt += 1;
        }
    }

    /// One round-trip, classified.
    async fn attempt(&self, request: &HttpRequest) -> RetryOutcome {
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) if error.is_transient() => return RetryOutcome::TransientFailure(error),
            Err(error) => return RetryOutcome::FatalFailure(error),
        };

        let observed = self.tracker.update(&response.headers);
        if let Some(remaining) = observed.remaining {
            if remaining < self.low_water_mark {
                self.observer.observe(RunEvent::QuotaLow {
                    remaining,
                    limit: observed.limit.or(self.tracker.snapshot().limit),
                });
            }
        }

        if response.status == StatusCode::TOO_MANY_REQUESTS {
            return RetryOutcome::Throttled(observed.retry_after_secs);
        }

        RetryOutcome::Success(response)
    }

    fn exhausted(&self, request: &HttpRequest, attempt: u32, last_failure: &str) -> AppError {
        log::error!(
            "{} {} failed {} times, giving up",
            request.method,
            request.url,
            attempt + 1
        );
        AppError::RetriesExhausted {
            attempts: attempt + 1,
            url: request.url.clone(),
            last_failure: last_failure.to_string(),
        }
    }
}
