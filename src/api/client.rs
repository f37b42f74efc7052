// src/api/client.rs
//! Pure HTTP plumbing for the platform API.
//!
//! This module provides the request/response values the engine passes
//! around, the [`HttpTransport`] seam, and a thin reqwest-backed
//! implementation of it. No retry, parsing or business logic lives here.

use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::AppError;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// A request the engine wants sent. Cheap to clone so it can be replayed
/// on retry.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Attaches `Authorization: Bearer <token>`.
    pub fn bearer(mut self, token: &crate::types::AccessToken) -> Result<Self, AppError> {
        let value = HeaderValue::from_str(&token.bearer()).map_err(|e| {
            AppError::MissingConfiguration(format!("Invalid access token format: {}", e))
        })?;
        self.headers.insert(header::AUTHORIZATION, value);
        Ok(self)
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// What came back. Any status, including errors, is a response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: String,
    pub body: String,
}

impl HttpResponse {
    /// Parses the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_str(&self.body).map_err(|e| {
            log::error!("Failed to parse response from {}: {}", self.url, e);
            AppError::MalformedResponse(format!("{} (body: {})", e, self.body_preview()))
        })
    }

    /// First few characters of the body, for error messages.
    pub fn body_preview(&self) -> String {
        if self.body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
            let head: String = self.body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
            format!("{}...", head)
        } else {
            self.body.clone()
        }
    }

    /// Turns any non-2xx status into an error carrying a body preview.
    pub fn error_for_status(self) -> Result<Self, AppError> {
        if self.status.is_success() {
            return Ok(self);
        }
        if self.status == StatusCode::UNAUTHORIZED {
            return Err(AppError::AuthorizationExpired {
                status: self.status,
                url: self.url,
            });
        }
        Err(AppError::Service {
            status: self.status,
            message: self.body_preview(),
            url: self.url,
        })
    }
}

/// The ability to put one request on the wire.
///
/// The engine depends on this trait, never on reqwest directly, so runs
/// can be driven against scripted transports.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AppError>;
}

/// A thin wrapper around reqwest Client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with JSON defaults and sane timeouts.
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers())
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(concat!("captionsweep/", env!("CARGO_PKG_VERSION"))),
        );
        headers
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AppError> {
        log::debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().to_string();
        let body = response.text().await?;

        log::debug!("{} {} -> {}", request.method, url, status);

        Ok(HttpResponse {
            status,
            headers,
            url,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: StatusCode, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HeaderMap::new(),
            url: "http://api.test/videos".to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn error_for_status_passes_success_through() {
        let ok = response(StatusCode::NO_CONTENT, "").error_for_status();
        assert!(ok.is_ok());
    }

    #[test]
    fn error_for_status_maps_unauthorized_to_expired_token() {
        let err = response(StatusCode::UNAUTHORIZED, "{}")
            .error_for_status()
            .unwrap_err();
        assert!(matches!(err, AppError::AuthorizationExpired { .. }));
    }

    #[test]
    fn error_for_status_keeps_a_short_preview() {
        let body = "x".repeat(500);
        let err = response(StatusCode::BAD_GATEWAY, &body)
            .error_for_status()
            .unwrap_err();
        match err {
            AppError::Service { status, message, .. } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(message.len(), ERROR_BODY_PREVIEW_LENGTH + 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bearer_sets_authorization_header() {
        let token = crate::types::AccessToken::new("tok").unwrap();
        let request = HttpRequest::get("http://api.test/videos")
            .bearer(&token)
            .unwrap();
        assert_eq!(
            request.headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer tok"
        );
    }

    #[test]
    fn json_reports_malformed_bodies() {
        let err = response(StatusCode::OK, "not json")
            .json::<serde_json::Value>()
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }
}
