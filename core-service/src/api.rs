//! Remote playlist API
//!
//! [`PlaylistApi`] is what the playlist editor talks to. [`HttpPlaylistApi`]
//! implements it against the library server's JSON routes over the
//! [`HttpClient`] bridge.

use crate::error::{CoreError, Result};
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_library::{Playlist, PlaylistDraft, Song};
use std::sync::Arc;
use tracing::{debug, warn};

/// Raw thumbnail bytes with their media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailData {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Operations the playlist editor needs from the server.
///
/// Lookups that miss return `None`/`false`; transport and server failures
/// are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    async fn get_all_songs(&self) -> Result<Vec<Song>>;

    async fn get_playlist_by_id(&self, id: &str) -> Result<Option<Playlist>>;

    /// Creates a playlist and returns it with its assigned id.
    async fn add_new_playlist(&self, draft: &PlaylistDraft) -> Result<Playlist>;

    async fn update_playlist(&self, id: &str, draft: &PlaylistDraft) -> Result<Option<Playlist>>;

    async fn delete_playlist(&self, id: &str) -> Result<bool>;

    /// Downloads a stored thumbnail by its server reference.
    async fn fetch_thumbnail(&self, reference: &str) -> Result<ThumbnailData>;
}

/// [`PlaylistApi`] over HTTP
pub struct HttpPlaylistApi {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl HttpPlaylistApi {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = ?request.method, url = %request.url, "Calling playlist API");
        let response = self.http.execute(request).await?;
        debug!(status = response.status, "Playlist API responded");
        Ok(response)
    }
}

fn api_error(response: &HttpResponse) -> CoreError {
    let message = response
        .json::<serde_json::Value>()
        .ok()
        .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .or_else(|| response.text().ok().filter(|t| !t.is_empty()))
        .unwrap_or_else(|| "request failed".to_string());

    warn!(status = response.status, %message, "Playlist API call failed");
    CoreError::Api {
        status: response.status,
        message,
    }
}

fn expect_success(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(api_error(&response))
    }
}

#[async_trait]
impl PlaylistApi for HttpPlaylistApi {
    async fn get_all_songs(&self) -> Result<Vec<Song>> {
        let request = HttpRequest::new(HttpMethod::Get, self.url("api/songs"));
        let response = expect_success(self.send(request).await?)?;
        Ok(response.json()?)
    }

    async fn get_playlist_by_id(&self, id: &str) -> Result<Option<Playlist>> {
        let request = HttpRequest::new(HttpMethod::Get, self.url(&format!("api/playlists/{}", id)));
        let response = self.send(request).await?;
        if response.status == 404 {
            return Ok(None);
        }
        Ok(Some(expect_success(response)?.json()?))
    }

    async fn add_new_playlist(&self, draft: &PlaylistDraft) -> Result<Playlist> {
        let request = HttpRequest::new(HttpMethod::Post, self.url("api/playlists")).json(draft)?;
        let response = expect_success(self.send(request).await?)?;
        Ok(response.json()?)
    }

    async fn update_playlist(&self, id: &str, draft: &PlaylistDraft) -> Result<Option<Playlist>> {
        let request = HttpRequest::new(HttpMethod::Put, self.url(&format!("api/playlists/{}", id)))
            .json(draft)?;
        let response = self.send(request).await?;
        if response.status == 404 {
            return Ok(None);
        }
        Ok(Some(expect_success(response)?.json()?))
    }

    async fn delete_playlist(&self, id: &str) -> Result<bool> {
        let request =
            HttpRequest::new(HttpMethod::Delete, self.url(&format!("api/playlists/{}", id)));
        let response = self.send(request).await?;
        if response.status == 404 {
            return Ok(false);
        }
        expect_success(response)?;
        Ok(true)
    }

    async fn fetch_thumbnail(&self, reference: &str) -> Result<ThumbnailData> {
        let request = HttpRequest::new(HttpMethod::Get, self.url(reference));
        let response = expect_success(self.send(request).await?)?;
        let content_type = response
            .header("content-type")
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(ThumbnailData {
            bytes: response.body,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use core_library::SongRef;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn api(http: MockHttp) -> HttpPlaylistApi {
        HttpPlaylistApi::new(Arc::new(http), "http://localhost:5020/")
    }

    fn draft() -> PlaylistDraft {
        PlaylistDraft {
            name: "Focus".to_string(),
            description: "Deep work".to_string(),
            thumbnail: "data:image/png;base64,AA==".to_string(),
            songs: vec![SongRef { id: 1 }],
        }
    }

    const PLAYLIST_JSON: &str = r#"{"id":"p1","name":"Focus","description":"Deep work","thumbnail":"assets/img/p1.png","songs":[{"id":1}]}"#;

    #[tokio::test]
    async fn test_get_all_songs() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|r| r.method == HttpMethod::Get && r.url == "http://localhost:5020/api/songs")
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"[{"id":1,"name":"Alpha","genre":"Rock","artist":"X","liked":false}]"#,
                ))
            });

        let songs = api(http).get_all_songs().await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].name, "Alpha");
    }

    #[tokio::test]
    async fn test_get_playlist_not_found_is_none() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .returning(|_| Ok(response(404, r#"{"error":"Playlist not found"}"#)));

        assert!(api(http).get_playlist_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_new_playlist_posts_json() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|r| {
                let body: serde_json::Value =
                    serde_json::from_slice(r.body.as_deref().unwrap_or_default()).unwrap();
                r.method == HttpMethod::Post
                    && r.url.ends_with("/api/playlists")
                    && r.headers.get("Content-Type").map(String::as_str) == Some("application/json")
                    && body["name"] == "Focus"
            })
            .returning(|_| Ok(response(201, PLAYLIST_JSON)));

        let created = api(http).add_new_playlist(&draft()).await.unwrap();
        assert_eq!(created.id, "p1");
    }

    #[tokio::test]
    async fn test_update_targets_id() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|r| r.method == HttpMethod::Put && r.url.ends_with("/api/playlists/p1"))
            .returning(|_| Ok(response(200, PLAYLIST_JSON)));

        let updated = api(http).update_playlist("p1", &draft()).await.unwrap();
        assert_eq!(updated.map(|p| p.thumbnail), Some("assets/img/p1.png".to_string()));
    }

    #[tokio::test]
    async fn test_delete_maps_statuses() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|r| r.url.ends_with("/p1"))
            .returning(|_| Ok(response(204, "")));
        http.expect_execute()
            .withf(|r| r.url.ends_with("/p2"))
            .returning(|_| Ok(response(404, "")));
        let api = api(http);

        assert!(api.delete_playlist("p1").await.unwrap());
        assert!(!api.delete_playlist("p2").await.unwrap());
    }

    #[tokio::test]
    async fn test_server_error_carries_message() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .returning(|_| Ok(response(400, r#"{"error":"Playlist name is required"}"#)));

        let err = api(http).add_new_playlist(&draft()).await.unwrap_err();
        match err {
            CoreError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Playlist name is required");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_bridge_error() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .returning(|_| Err(BridgeError::OperationFailed("Connection failed".to_string())));

        assert!(matches!(
            api(http).get_all_songs().await,
            Err(CoreError::Bridge(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_thumbnail_reads_content_type() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|r| r.url == "http://localhost:5020/assets/img/p1.png")
            .returning(|_| {
                let mut headers = HashMap::new();
                headers.insert("Content-Type".to_string(), "image/png".to_string());
                Ok(HttpResponse {
                    status: 200,
                    headers,
                    body: Bytes::from_static(&[1, 2, 3]),
                })
            });

        let thumbnail = api(http).fetch_thumbnail("assets/img/p1.png").await.unwrap();
        assert_eq!(thumbnail.content_type, "image/png");
        assert_eq!(thumbnail.bytes.as_ref(), &[1, 2, 3]);
    }
}
