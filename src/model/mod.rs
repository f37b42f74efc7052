// src/model/mod.rs
//! Domain model: the videos being walked and the caption tracks on them.

use crate::types::{LanguageTag, VideoId};
use std::fmt;

/// A video in the catalog. Captions are fetched separately, one video at
/// a time, and never kept once that video is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub id: VideoId,
    pub title: String,
}

impl Video {
    /// Title for display, falling back to the ID for untitled videos.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.title
        }
    }
}

/// One caption track, addressed by its language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub language: LanguageTag,
    pub language_name: Option<String>,
}

impl CaptionTrack {
    pub fn new(language: LanguageTag) -> Self {
        Self {
            language,
            language_name: None,
        }
    }
}

impl fmt::Display for CaptionTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.language_name {
            Some(name) => write!(f, "{} ({})", self.language, name),
            None => write!(f, "{}", self.language),
        }
    }
}

/// Which caption tracks a run touches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LanguageFilter {
    #[default]
    All,
    Only(Vec<LanguageTag>),
}

impl LanguageFilter {
    pub fn from_tags(tags: Vec<LanguageTag>) -> Self {
        if tags.is_empty() {
            Self::All
        } else {
            Self::Only(tags)
        }
    }

    pub fn accepts(&self, track: &CaptionTrack) -> bool {
        match self {
            Self::All => true,
            Self::Only(tags) => tags.iter().any(|tag| tag.matches(&track.language)),
        }
    }
}
