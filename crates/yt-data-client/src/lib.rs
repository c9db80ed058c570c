mod error;
mod types;
mod upload;

pub use error::ApiError;
pub use types::{Playlist, PlaylistSnippet, Video, VideoMetadata};
pub use upload::DEFAULT_CHUNK_SIZE;

use yt_oauth::AuthenticatedClient;

/// Default base address of the YouTube Data API
pub const DEFAULT_API_ADDRESS: &str = "https://www.googleapis.com";

pub struct YouTubeClient {
    client: AuthenticatedClient,
    base_url: String,
    chunk_size: usize,
}

impl YouTubeClient {
    pub fn new(client: AuthenticatedClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Upload chunk size; the service expects a multiple of 256 KiB
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Find one of the user's playlists by exact title
    pub async fn find_playlist(&self, title: &str) -> Result<Option<String>, ApiError> {
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.url("/youtube/v3/playlists"))
                .await?
                .query(&[("part", "snippet"), ("mine", "true"), ("maxResults", "50")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = check(request.send().await?, "Listing playlists").await?;
            let page: types::PlaylistListResponse = response.json().await?;

            if let Some(playlist) = page.items.into_iter().find(|p| p.snippet.title == title) {
                return Ok(Some(playlist.id));
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(None),
            }
        }
    }

    /// Create a playlist and return its id
    pub async fn create_playlist(&self, title: &str, privacy_status: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({
            "snippet": { "title": title },
            "status": { "privacyStatus": privacy_status },
        });

        let response = self
            .client
            .post(self.url("/youtube/v3/playlists"))
            .await?
            .query(&[("part", "snippet,status")])
            .json(&body)
            .send()
            .await?;
        let playlist: Playlist = check(response, "Creating playlist").await?.json().await?;

        tracing::debug!(id = %playlist.id, title, "created playlist");
        Ok(playlist.id)
    }

    /// Append a video to a playlist
    pub async fn add_to_playlist(&self, video_id: &str, playlist_id: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "snippet": {
                "playlistId": playlist_id,
                "resourceId": {
                    "kind": "youtube#video",
                    "videoId": video_id,
                },
            },
        });

        let response = self
            .client
            .post(self.url("/youtube/v3/playlistItems"))
            .await?
            .query(&[("part", "snippet")])
            .json(&body)
            .send()
            .await?;
        check(response, "Adding video to playlist").await?;

        Ok(())
    }
}

/// Turn a non-success response into [`ApiError::Status`] carrying its body
async fn check(
    response: reqwest::Response,
    context: &'static str,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    Err(ApiError::Status {
        context,
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use yt_oauth::{AuthError, OAuthConfig, OAuthToken, TokenStore};

    pub(crate) fn client(server: &MockServer) -> YouTubeClient {
        let token = OAuthToken {
            access_token: "tok1".to_string(),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            expires_at: None,
        };
        YouTubeClient::new(AuthenticatedClient::new(token).unwrap(), server.uri())
    }

    #[tokio::test]
    async fn find_playlist_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/playlists"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{ "id": "PL2", "snippet": { "title": "Trips" } }],
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/playlists"))
            .and(query_param("mine", "true"))
            .and(header("authorization", "Bearer tok1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{ "id": "PL1", "snippet": { "title": "Other" } }],
                "nextPageToken": "p2",
            })))
            .mount(&server)
            .await;

        let found = client(&server).find_playlist("Trips").await.unwrap();
        assert_eq!(found.as_deref(), Some("PL2"));
    }

    #[tokio::test]
    async fn find_playlist_without_match_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/playlists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{ "id": "PL1", "snippet": { "title": "trips" } }],
            })))
            .mount(&server)
            .await;

        assert_eq!(client(&server).find_playlist("Trips").await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_playlist_uses_requested_privacy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/youtube/v3/playlists"))
            .and(query_param("part", "snippet,status"))
            .and(body_partial_json(serde_json::json!({
                "snippet": { "title": "Trips" },
                "status": { "privacyStatus": "private" },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "PLNEW", "snippet": { "title": "Trips" },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server)
            .create_playlist("Trips", "private")
            .await
            .unwrap();
        assert_eq!(id, "PLNEW");
    }

    #[tokio::test]
    async fn add_to_playlist_reports_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/youtube/v3/playlistItems"))
            .and(body_partial_json(serde_json::json!({
                "snippet": { "playlistId": "PL1", "resourceId": { "videoId": "vid" } },
            })))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = client(&server)
            .add_to_playlist("vid", "PL1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 403, ref body, .. } if body == "forbidden"));
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_before_api_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok2",
                "expires_in": 3600,
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/playlists"))
            .and(header("authorization", "Bearer tok2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{ "id": "PL1", "snippet": { "title": "Trips" } }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = OAuthConfig::new("id".to_string(), "secret".to_string())
            .with_endpoints(format!("{}/auth", server.uri()), format!("{}/token", server.uri()));
        let expired = OAuthToken {
            access_token: "tok1".to_string(),
            refresh_token: Some("r1".to_string()),
            token_type: "Bearer".to_string(),
            expires_at: Some(0),
        };
        let auth = AuthenticatedClient::with_refresh(
            expired,
            config,
            TokenStore::new(dir.path().join("cache")),
        )
        .unwrap();

        let found = YouTubeClient::new(auth, server.uri())
            .find_playlist("Trips")
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("PL1"));
    }

    #[tokio::test]
    async fn failed_refresh_surfaces_as_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = OAuthConfig::new("id".to_string(), "secret".to_string())
            .with_endpoints(format!("{}/auth", server.uri()), format!("{}/token", server.uri()));
        let expired = OAuthToken {
            access_token: "tok1".to_string(),
            refresh_token: Some("r1".to_string()),
            token_type: "Bearer".to_string(),
            expires_at: Some(0),
        };
        let auth = AuthenticatedClient::with_refresh(
            expired,
            config,
            TokenStore::new(dir.path().join("cache")),
        )
        .unwrap();

        let err = YouTubeClient::new(auth, server.uri())
            .create_playlist("Trips", "private")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::Exchange { status: 400, .. })));
    }
}
