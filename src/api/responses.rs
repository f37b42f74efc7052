// src/api/responses.rs
//! Wire shapes of the platform responses the engine reads.
//!
//! Only the fields the engine needs are declared; everything else in the
//! payloads is ignored.

use super::pagination::PageEnvelope;
use crate::model::{CaptionTrack, Video};
use crate::types::{LanguageTag, ValidationError, VideoId};
use serde::Deserialize;

/// Body of a successful authentication.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Body of a list endpoint: items plus page counters.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub pages_total: u32,
}

/// Identifiers stay plain strings on the wire; they become domain types
/// once the page is unpacked, so one odd record cannot fail the whole body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionRecord {
    pub srclang: String,
    #[serde(default)]
    pub language_name: Option<String>,
}

impl TryFrom<VideoRecord> for Video {
    type Error = ValidationError;

    fn try_from(record: VideoRecord) -> Result<Self, Self::Error> {
        Ok(Video {
            id: VideoId::parse(&record.video_id)?,
            title: record.title.unwrap_or_default(),
        })
    }
}

impl TryFrom<CaptionRecord> for CaptionTrack {
    type Error = ValidationError;

    fn try_from(record: CaptionRecord) -> Result<Self, Self::Error> {
        Ok(CaptionTrack {
            language: LanguageTag::from_platform(&record.srclang)?,
            language_name: record.language_name,
        })
    }
}

impl ListResponse<VideoRecord> {
    /// Converts into a page envelope. A body without pagination counters
    /// is treated as the only page. Records without a usable id are
    /// skipped with a warning.
    pub fn into_page(self, requested_page: u32) -> PageEnvelope<Video> {
        let (current_page, total_pages) = match self.pagination {
            Some(p) => (p.current_page, p.pages_total),
            None => (requested_page, requested_page),
        };
        let items = self
            .data
            .into_iter()
            .filter_map(|record| match Video::try_from(record) {
                Ok(video) => Some(video),
                Err(e) => {
                    log::warn!("Skipping video on page {}: {}", current_page, e);
                    None
                }
            })
            .collect();
        PageEnvelope {
            items,
            current_page,
            total_pages,
        }
    }
}

impl ListResponse<CaptionRecord> {
    /// Caption tracks of one video; unaddressable tracks are skipped.
    pub fn into_tracks(self, video: &VideoId) -> Vec<CaptionTrack> {
        self.data
            .into_iter()
            .filter_map(|record| match CaptionTrack::try_from(record) {
                Ok(track) => Some(track),
                Err(e) => {
                    log::warn!("Skipping caption track on {}: {}", video, e);
                    None
                }
            })
            .collect()
    }
}
