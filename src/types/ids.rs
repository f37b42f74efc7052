use super::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::marker::PhantomData;

/// Strong typing for remote identifiers with phantom types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoMarker;

pub type VideoId = Id<VideoMarker>;

impl<T> Id<T> {
    /// Parse an identifier as returned by the platform.
    ///
    /// Identifiers are opaque: any non-empty value is accepted and
    /// percent-encoded when it becomes a path segment. Only values that
    /// cannot address a resource at all are rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = opaque_segment(input).map_err(ValidationError::InvalidVideoId)?;
        Ok(Self {
            value,
            _phantom: PhantomData,
        })
    }

    /// Get the ID as a string reference
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Trims a remote identifier and rejects values that cannot stand as a
/// single path segment.
fn opaque_segment(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("identifier cannot be empty".to_string());
    }
    if trimmed == "." || trimmed == ".." {
        return Err(format!("'{}' cannot be used as a path segment", trimmed));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(format!("identifier contains control characters: {:?}", trimmed));
    }
    Ok(trimmed.to_string())
}

static LANGUAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{1,8})*$").expect("language tag pattern is valid")
});

/// A caption track's language, e.g. `en`, `fr-CA`, `zh-Hant`.
///
/// Caption tracks are addressed by language, so the tag doubles as the
/// track identifier in delete calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Parses a tag typed by the user, which must look like BCP 47.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if !LANGUAGE_TAG.is_match(trimmed) {
            return Err(ValidationError::InvalidLanguageTag(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Accepts a tag reported by the platform as-is. Tracks are deleted by
    /// the tag the platform knows them under, even when it is not BCP 47
    /// (`en_US`, `pt.br`).
    pub fn from_platform(input: &str) -> Result<Self, ValidationError> {
        opaque_segment(input)
            .map(Self)
            .map_err(|_| ValidationError::InvalidLanguageTag(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, as tags are in BCP 47.
    pub fn matches(&self, other: &LanguageTag) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
