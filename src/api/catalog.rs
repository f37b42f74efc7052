// src/api/catalog.rs
//! Endpoint construction and response interpretation for the platform.
//!
//! Every call goes through the shared [`RetryingExecutor`]; this layer only
//! decides which statuses mean what for each endpoint.

use super::client::HttpRequest;
use super::executor::RetryingExecutor;
use super::pagination::PageEnvelope;
use super::responses::{CaptionRecord, ListResponse, TokenResponse, VideoRecord};
use super::VideoCatalog;
use crate::error::AppError;
use crate::model::{CaptionTrack, Video};
use crate::types::{AccessToken, ApiKey, BaseUrl, LanguageTag, VideoId};
use reqwest::StatusCode;

/// The platform's REST API, seen through a retrying executor.
#[derive(Clone)]
pub struct PlatformClient {
    base_url: BaseUrl,
    executor: RetryingExecutor,
}

impl PlatformClient {
    pub fn new(base_url: BaseUrl, executor: RetryingExecutor) -> Self {
        Self { base_url, executor }
    }

    fn videos_url(&self, page: u32, page_size: u32) -> String {
        format!(
            "{}?currentPage={}&pageSize={}",
            self.base_url.endpoint("videos"),
            page,
            page_size
        )
    }

    fn captions_url(&self, video: &VideoId) -> String {
        self.base_url.segments(["videos", video.as_str(), "captions"])
    }

    fn caption_url(&self, video: &VideoId, language: &LanguageTag) -> String {
        self.base_url
            .segments(["videos", video.as_str(), "captions", language.as_str()])
    }
}

#[async_trait::async_trait]
impl VideoCatalog for PlatformClient {
    async fn authenticate(&self, api_key: &ApiKey) -> Result<AccessToken, AppError> {
        let request = HttpRequest::post(self.base_url.endpoint("auth/api-key"))
            .json(serde_json::json!({ "apiKey": api_key.as_str() }));

        let response = self.executor.execute(&request).await?;
        if !response.status.is_success() {
            log::error!("Authentication rejected with HTTP {}", response.status);
            return Err(AppError::AuthenticationFailed {
                status: response.status,
                message: response.body_preview(),
            });
        }

        let token: TokenResponse = response.json()?;
        Ok(AccessToken::new(token.access_token)?)
    }

    async fn fetch_video_page(
        &self,
        token: &AccessToken,
        page: u32,
        page_size: u32,
    ) -> Result<PageEnvelope<Video>, AppError> {
        let request = HttpRequest::get(self.videos_url(page, page_size)).bearer(token)?;
        let response = self.executor.execute(&request).await?.error_for_status()?;
        let list: ListResponse<VideoRecord> = response.json()?;
        Ok(list.into_page(page))
    }

    async fn list_captions(
        &self,
        token: &AccessToken,
        video: &VideoId,
    ) -> Result<Vec<CaptionTrack>, AppError> {
        let request = HttpRequest::get(self.captions_url(video)).bearer(token)?;
        let response = self.executor.execute(&request).await?;

        if response.status == StatusCode::NOT_FOUND {
            log::debug!("No captions on {}", video);
            return Ok(Vec::new());
        }

        let list: ListResponse<CaptionRecord> = response.error_for_status()?.json()?;
        Ok(list.into_tracks(video))
    }

    async fn delete_caption(
        &self,
        token: &AccessToken,
        video: &VideoId,
        language: &LanguageTag,
    ) -> Result<(), AppError> {
        let request = HttpRequest::delete(self.caption_url(video, language)).bearer(token)?;
        self.executor.execute(&request).await?.error_for_status()?;
        log::debug!("Deleted {} captions on {}", language, video);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sleeper::RecordingSleeper;
    use crate::api::testing::{Reply, ScriptedTransport};
    use crate::api::RateLimitTracker;
    use crate::events::CollectingObserver;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: Arc<ScriptedTransport>) -> PlatformClient {
        let executor = RetryingExecutor::new(transport, Arc::new(RateLimitTracker::new()))
            .with_sleeper(Arc::new(RecordingSleeper::new()))
            .with_observer(Arc::new(CollectingObserver::new()));
        PlatformClient::new(BaseUrl::parse("http://api.test").unwrap(), executor)
    }

    fn token() -> AccessToken {
        AccessToken::new("tok").unwrap()
    }

    #[tokio::test]
    async fn authenticate_returns_the_token() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(
            Method::POST,
            "/auth/api-key",
            Reply::ok(json!({"access_token": "abc", "token_type": "Bearer"})),
        );

        let token = client(transport)
            .authenticate(&ApiKey::new("key-123456").unwrap())
            .await
            .unwrap();

        assert_eq!(token.as_str(), "abc");
    }

    #[tokio::test]
    async fn authenticate_surfaces_rejection() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(
            Method::POST,
            "/auth/api-key",
            Reply::status(401, r#"{"title":"bad key"}"#),
        );

        let err = client(transport)
            .authenticate(&ApiKey::new("key-123456").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::AuthenticationFailed {
                status: StatusCode::UNAUTHORIZED,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_captions_are_not_an_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(Method::GET, "/videos/vi1/captions", Reply::status(404, "{}"));

        let tracks = client(transport)
            .list_captions(&token(), &VideoId::parse("vi1").unwrap())
            .await
            .unwrap();

        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn server_errors_on_discovery_are_errors() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(Method::GET, "/videos/vi1/captions", Reply::status(500, "oops"));

        let err = client(transport)
            .list_captions(&token(), &VideoId::parse("vi1").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Service { .. }));
    }

    #[tokio::test]
    async fn delete_maps_unauthorized_to_expired_token() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(Method::DELETE, "/videos/vi1/captions/en", Reply::status(401, ""));

        let err = client(transport)
            .delete_caption(
                &token(),
                &VideoId::parse("vi1").unwrap(),
                &LanguageTag::parse("en").unwrap(),
            )
            .await
            .unwrap_err();

        assert!(err.is_fatal_for_batch());
    }

    #[tokio::test]
    async fn video_pages_are_requested_by_number() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(
            Method::GET,
            "/videos",
            Reply::ok(json!({
                "data": [{"videoId": "vi9", "title": "Nine"}],
                "pagination": {"currentPage": 2, "pagesTotal": 4}
            })),
        );

        let page = client(transport)
            .fetch_video_page(&token(), 2, 50)
            .await
            .unwrap();

        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.items[0].id.as_str(), "vi9");
    }

    #[tokio::test]
    async fn identifiers_are_encoded_into_their_own_segment() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(
            Method::GET,
            "/videos/vi%202%2Fx/captions",
            Reply::ok(json!({"data": [{"srclang": "en_US"}]})),
        );
        transport.on(
            Method::DELETE,
            "/videos/vi%202%2Fx/captions/en_US",
            Reply::status(204, ""),
        );
        let client = client(transport.clone());
        let video = VideoId::parse("vi 2/x").unwrap();

        let tracks = client.list_captions(&token(), &video).await.unwrap();
        assert_eq!(tracks.len(), 1);
        client
            .delete_caption(&token(), &video, &tracks[0].language)
            .await
            .unwrap();

        assert_eq!(
            transport.count(&Method::DELETE, "/videos/vi%202%2Fx/captions/en_US"),
            1
        );
    }
}
