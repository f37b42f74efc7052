// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use std::fmt;
use url::Url;

/// API key exchanged for an access token at the start of a run
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key with validation
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();

        if key.is_empty() {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key cannot be empty".to_string(),
            });
        }

        if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key must not contain whitespace".to_string(),
            });
        }

        if key.len() < 8 {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key is too short".to_string(),
            });
        }

        Ok(Self(key))
    }

    /// Get the API key as a string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Redact API key in display
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "{}...", prefix)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self)
    }
}

/// Bearer token obtained from authentication, valid for the whole run.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ValidationError::EmptyField("access_token"));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Validated API base URL, stored without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Url);

impl BaseUrl {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let url = Url::parse(input.trim()).map_err(|e| ValidationError::InvalidUrl {
            url: input.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ValidationError::InvalidUrl {
                    url: input.to_string(),
                    reason: format!("unsupported scheme '{}'", other),
                })
            }
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(ValidationError::InvalidUrl {
                url: input.to_string(),
                reason: "base URL must not carry a query or fragment".to_string(),
            });
        }

        Ok(Self(url))
    }

    /// Joins a path below the base, e.g. `videos/abc/captions`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Appends path segments below the base, percent-encoding each one so
    /// that `/`, `%`, `?` and the like stay inside their segment.
    pub fn segments<I, S>(&self, segments: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.0.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str().trim_end_matches('/'))
    }
}
