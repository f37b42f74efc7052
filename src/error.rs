// src/error.rs
//! Application error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the system.
//! The classification helpers at the bottom decide how far a failure
//! travels: retried by the executor, absorbed at the video boundary,
//! or surfaced to the top-level caller.

use reqwest::StatusCode;
use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    /// Transport-level failure reported by a non-reqwest transport.
    #[error("Transport failure: {message}")]
    Transport { message: String, transient: bool },

    #[error("Authentication failed with HTTP {status}: {message}")]
    AuthenticationFailed { status: StatusCode, message: String },

    /// The access token stopped being accepted mid-run.
    #[error("Access token rejected by {url} (HTTP {status})")]
    AuthorizationExpired { status: StatusCode, url: String },

    #[error("API returned HTTP {status} for {url}: {message}")]
    Service {
        status: StatusCode,
        message: String,
        url: String,
    },

    #[error("Gave up on {url} after {attempts} attempts: {last_failure}")]
    RetriesExhausted {
        attempts: u32,
        url: String,
        last_failure: String,
    },

    /// A batch stopped on an error that would fail every remaining call.
    #[error("Batch aborted after {deleted} deletion(s): {source}")]
    BatchAborted {
        deleted: usize,
        #[source]
        source: Box<AppError>,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

impl AppError {
    /// Whether a transport failure is worth another attempt.
    ///
    /// Builder and redirect errors come from the request itself and would
    /// fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::NetworkFailure(e) => !(e.is_builder() || e.is_redirect()),
            AppError::Transport { transient, .. } => *transient,
            _ => false,
        }
    }

    /// Whether a single deletion failure must stop the whole batch.
    ///
    /// A rejected token fails every remaining call in the same way, so the
    /// batch gives up instead of burning quota on it.
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(self, AppError::AuthorizationExpired { .. })
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_transience_follows_flag() {
        let transient = AppError::Transport {
            message: "connection reset".to_string(),
            transient: true,
        };
        let permanent = AppError::Transport {
            message: "invalid request".to_string(),
            transient: false,
        };
        assert!(transient.is_transient());
        assert!(!permanent.is_transient());
    }

    #[test]
    fn http_errors_are_not_transient() {
        let err = AppError::Service {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_string(),
            url: "http://x/videos".to_string(),
        };
        assert!(!err.is_transient());
        assert!(!err.is_fatal_for_batch());
    }

    #[test]
    fn only_expired_authorization_stops_a_batch() {
        let expired = AppError::AuthorizationExpired {
            status: StatusCode::UNAUTHORIZED,
            url: "http://x/videos/a/captions/en".to_string(),
        };
        let service = AppError::Service {
            status: StatusCode::NOT_FOUND,
            message: "gone".to_string(),
            url: "http://x/videos/a/captions/en".to_string(),
        };
        assert!(expired.is_fatal_for_batch());
        assert!(!service.is_fatal_for_batch());
    }

    #[test]
    fn malformed_bodies_become_malformed_response() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn error_messages_read_naturally() {
        let err = AppError::RetriesExhausted {
            attempts: 4,
            url: "http://x/videos".to_string(),
            last_failure: "HTTP 429".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Gave up on http://x/videos after 4 attempts: HTTP 429"
        );
    }
}
