use thiserror::Error;

mod domain_types;
mod ids;

pub use domain_types::*;
pub use ids::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid video ID: {0}")]
    InvalidVideoId(String),

    #[error("Invalid language tag: {0}")]
    InvalidLanguageTag(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Value out of bounds: {value}, expected {min}..={max}")]
    OutOfBounds { value: u32, min: u32, max: u32 },

    #[error("Invalid API key format: {reason}")]
    InvalidApiKey { reason: String },
}
