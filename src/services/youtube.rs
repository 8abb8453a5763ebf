// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! YouTube Data API and Google OAuth client.
//!
//! Handles:
//! - Channel, playlist, search and video lookups
//! - Resumable uploads and thumbnail uploads
//! - Video metadata updates and deletion
//! - Authorization code exchange and token refresh
//!
//! Every call takes the access token explicitly; token lifecycle lives in
//! `accounts` and `executor`.

use std::time::Duration;

use anyhow::Context;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{YouTubeConfig, YouTubeEndpoints};
use crate::error::AppError;
use crate::models::Visibility;

/// Timeout for metadata calls. Media uploads are not bounded.
const API_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Assumed access token lifetime when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Largest page the Data API serves.
pub const MAX_PAGE_SIZE: u32 = 50;

/// YouTube category "People & Blogs".
const VLOG_CATEGORY_ID: &str = "22";

/// Scopes requested during the OAuth handshake.
pub const YOUTUBE_SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/youtube.force-ssl",
    "https://www.googleapis.com/auth/youtube.upload",
    "https://www.googleapis.com/auth/youtube.readonly",
    "https://www.googleapis.com/auth/youtube",
];

/// YouTube API client.
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    endpoints: YouTubeEndpoints,
    client_id: Option<String>,
    client_secret: Option<String>,
    api_key: Option<String>,
}

impl YouTubeClient {
    pub fn new(config: &YouTubeConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("failed building YouTube HTTP client")?;

        Ok(Self {
            http,
            endpoints: config.endpoints.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// OAuth client ID and secret, or a configuration error.
    pub fn credentials(&self) -> Result<(&str, &str), AppError> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(AppError::Configuration(
                "YouTube client credentials are not configured".to_string(),
            )),
        }
    }

    // ─── Data API ────────────────────────────────────────────────────────────

    /// ID of the channel owned by the token's account, if it has one.
    pub async fn channel_id(&self, access_token: &str) -> Result<Option<String>, AppError> {
        let url = format!("{}/channels", self.endpoints.api_base);
        let response: ListResponse<Channel> = self
            .get_json(&url, access_token, &[("part", "id"), ("mine", "true")])
            .await?;

        Ok(response.items.into_iter().next().map(|c| c.id))
    }

    /// Uploads playlist of a channel.
    pub async fn uploads_playlist_id(
        &self,
        access_token: &str,
        channel_id: &str,
    ) -> Result<Option<String>, AppError> {
        let url = format!("{}/channels", self.endpoints.api_base);
        let response: ListResponse<Channel> = self
            .get_json(
                &url,
                access_token,
                &[("part", "contentDetails"), ("id", channel_id)],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .next()
            .and_then(|c| c.content_details)
            .and_then(|d| d.related_playlists.uploads))
    }

    /// One page of a playlist, with snippet and status.
    pub async fn list_playlist_items(
        &self,
        access_token: &str,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<ListResponse<PlaylistItem>, AppError> {
        let url = format!("{}/playlistItems", self.endpoints.api_base);
        let max_results = MAX_PAGE_SIZE.to_string();
        let mut params = vec![
            ("part", "snippet,status"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        self.get_json(&url, access_token, &params).await
    }

    /// Videos owned by the token's account, via search.
    pub async fn search_my_videos(
        &self,
        access_token: &str,
    ) -> Result<ListResponse<SearchResult>, AppError> {
        let url = format!("{}/search", self.endpoints.api_base);
        let max_results = MAX_PAGE_SIZE.to_string();

        self.get_json(
            &url,
            access_token,
            &[
                ("part", "snippet"),
                ("forMine", "true"),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
            ],
        )
        .await
    }

    pub async fn get_video(
        &self,
        access_token: &str,
        video_id: &str,
    ) -> Result<Option<Video>, AppError> {
        let url = format!("{}/videos", self.endpoints.api_base);
        let response: ListResponse<Video> = self
            .get_json(
                &url,
                access_token,
                &[("part", "snippet,status"), ("id", video_id)],
            )
            .await?;

        Ok(response.items.into_iter().next())
    }

    /// Replace title, description and privacy status of a video.
    pub async fn update_video(
        &self,
        access_token: &str,
        video_id: &str,
        metadata: &VideoMetadata,
    ) -> Result<(), AppError> {
        let url = format!("{}/videos", self.endpoints.api_base);

        let response = self
            .with_key(self.http.put(&url))
            .query(&[("part", "snippet,status")])
            .bearer_auth(access_token)
            .timeout(API_TIMEOUT)
            .json(&metadata.to_resource(Some(video_id)))
            .send()
            .await
            .map_err(request_failed)?;

        check_response(response).await?;
        Ok(())
    }

    pub async fn delete_video(&self, access_token: &str, video_id: &str) -> Result<(), AppError> {
        let url = format!("{}/videos", self.endpoints.api_base);

        let response = self
            .with_key(self.http.delete(&url))
            .query(&[("id", video_id)])
            .bearer_auth(access_token)
            .timeout(API_TIMEOUT)
            .send()
            .await
            .map_err(request_failed)?;

        check_response(response).await?;
        Ok(())
    }

    // ─── Uploads ─────────────────────────────────────────────────────────────

    /// Open a resumable upload session; returns the session URL.
    pub async fn start_resumable_upload(
        &self,
        access_token: &str,
        metadata: &VideoMetadata,
        content_type: &str,
        content_length: usize,
    ) -> Result<String, AppError> {
        let url = format!("{}/videos", self.endpoints.upload_base);

        let response = self
            .with_key(self.http.post(&url))
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(access_token)
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", content_length.to_string())
            .timeout(API_TIMEOUT)
            .json(&metadata.to_resource(None))
            .send()
            .await
            .map_err(request_failed)?;

        let response = check_response(response).await?;

        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| AppError::YouTubeApi {
                status: 502,
                message: "Upload session URL missing from response".to_string(),
            })
    }

    /// Send the video bytes to an upload session; returns the new video ID.
    pub async fn upload_video_bytes(
        &self,
        access_token: &str,
        session_url: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, AppError> {
        let response = self
            .http
            .put(session_url)
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(request_failed)?;

        let uploaded: UploadedVideo = check_response_json(response).await?;
        Ok(uploaded.id)
    }

    pub async fn set_thumbnail(
        &self,
        access_token: &str,
        video_id: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<(), AppError> {
        let url = format!("{}/thumbnails/set", self.endpoints.upload_base);

        let response = self
            .with_key(self.http.post(&url))
            .query(&[("videoId", video_id)])
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(request_failed)?;

        check_response(response).await?;
        Ok(())
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    /// Consent screen URL for the handshake.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<String, AppError> {
        let client_id = self.client_id.as_deref().ok_or_else(|| {
            AppError::Configuration("YouTube client ID is not configured".to_string())
        })?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            self.endpoints.auth_url,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&YOUTUBE_SCOPES.join(" ")),
            urlencoding::encode(state),
        ))
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant, AppError> {
        let (client_id, client_secret) = self.credentials()?;

        let response = self
            .http
            .post(&self.endpoints.token_url)
            .timeout(API_TIMEOUT)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(request_failed)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                error = %oauth_error(&body),
                "Authorization code exchange failed"
            );
            return Err(AppError::YouTubeApi {
                status: status.as_u16(),
                message: format!("Authorization code exchange failed: {}", oauth_error(&body)),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::YouTubeApi {
                status: 502,
                message: format!("Failed to parse token response: {}", e),
            })?;

        Ok(token.into_grant(Utc::now()))
    }

    /// Trade a refresh token for a new access token.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, AppError> {
        let (client_id, client_secret) = self.credentials()?;

        let response = self
            .http
            .post(&self.endpoints.token_url)
            .timeout(API_TIMEOUT)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::TokenRefresh(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::TokenRefresh(format!(
                "HTTP {}: {}",
                status.as_u16(),
                oauth_error(&body)
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::TokenRefresh(format!("invalid token response: {}", e)))?;

        Ok(token.into_grant(Utc::now()))
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
        params: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let response = self
            .with_key(self.http.get(url))
            .query(params)
            .bearer_auth(access_token)
            .timeout(API_TIMEOUT)
            .send()
            .await
            .map_err(request_failed)?;

        check_response_json(response).await
    }
}

fn request_failed(e: reqwest::Error) -> AppError {
    AppError::YouTubeApi {
        status: 502,
        message: format!("request failed: {}", e),
    }
}

/// Map a non-success response to an error. 401 becomes `YouTubeUnauthorized`
/// so the executor can refresh and retry.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    if status == 401 {
        return Err(AppError::YouTubeUnauthorized);
    }

    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    Err(AppError::YouTubeApi { status, message })
}

async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    check_response(response)
        .await?
        .json()
        .await
        .map_err(|e| AppError::YouTubeApi {
            status: 502,
            message: format!("JSON parse error: {}", e),
        })
}

/// `error` / `error_description` from an OAuth error body, for logs and messages.
fn oauth_error(body: &str) -> String {
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(e) => match e.error_description {
            Some(desc) => format!("{} ({})", e.error, desc),
            None => e.error,
        },
        Err(_) => body.to_string(),
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct OAuthErrorBody {
    error: String,
    error_description: Option<String>,
}

// ─── Token responses ─────────────────────────────────────────────────────────

/// Raw token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_grant(self, now: DateTime<Utc>) -> TokenGrant {
        let lifetime = self.expires_in.unwrap_or_else(|| {
            tracing::warn!(
                default_secs = DEFAULT_TOKEN_LIFETIME_SECS,
                "Token response has no expires_in, assuming default lifetime"
            );
            DEFAULT_TOKEN_LIFETIME_SECS
        });

        TokenGrant {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: now + chrono::Duration::seconds(lifetime),
        }
    }
}

/// Tokens issued by Google, with the expiry computed from `expires_in`.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    /// Present on code exchange and when Google rotates the refresh token
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

// ─── Data API resources ──────────────────────────────────────────────────────

/// Generic list envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Channel {
    id: String,
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    /// Only on playlist items
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub privacy_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Largest available thumbnail: high, then medium, then default.
    pub fn best_url(&self) -> Option<&str> {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.as_str())
            .next()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    #[serde(default)]
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Deserialize)]
struct UploadedVideo {
    id: String,
}

/// Editable video fields.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub visibility: Visibility,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    snippet: VideoSnippetBody<'a>,
    status: VideoStatusBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippetBody<'a> {
    title: &'a str,
    description: &'a str,
    category_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatusBody<'a> {
    privacy_status: &'a str,
}

impl VideoMetadata {
    fn to_resource<'a>(&'a self, id: Option<&'a str>) -> VideoResource<'a> {
        VideoResource {
            id,
            snippet: VideoSnippetBody {
                title: &self.title,
                description: &self.description,
                category_id: VLOG_CATEGORY_ID,
            },
            status: VideoStatusBody {
                privacy_status: self.visibility.as_privacy_status(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> YouTubeClient {
        let config = YouTubeConfig {
            client_id: Some("cid".to_string()),
            client_secret: Some("secret".to_string()),
            endpoints: YouTubeEndpoints {
                api_base: server.url(),
                upload_base: format!("{}/upload", server.url()),
                token_url: format!("{}/token", server.url()),
                auth_url: format!("{}/auth", server.url()),
            },
            ..Default::default()
        };
        YouTubeClient::new(&config).unwrap()
    }

    #[test]
    fn test_best_thumbnail_prefers_high() {
        let thumbs: Thumbnails = serde_json::from_value(serde_json::json!({
            "default": {"url": "d"},
            "medium": {"url": "m"}
        }))
        .unwrap();
        assert_eq!(thumbs.best_url(), Some("m"));
        assert_eq!(Thumbnails::default().best_url(), None);
    }

    #[test]
    fn test_video_resource_body() {
        let metadata = VideoMetadata {
            title: "Day 1".to_string(),
            description: "hello".to_string(),
            visibility: Visibility::Unlisted,
        };
        let body = serde_json::to_value(metadata.to_resource(Some("vid"))).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "id": "vid",
                "snippet": {"title": "Day 1", "description": "hello", "categoryId": "22"},
                "status": {"privacyStatus": "unlisted"}
            })
        );
    }

    #[test]
    fn test_token_response_uses_expires_in() {
        let now = Utc::now();
        let grant = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: None,
            expires_in: Some(120),
        }
        .into_grant(now);
        assert_eq!(grant.expires_at, now + chrono::Duration::seconds(120));

        let grant = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: None,
            expires_in: None,
        }
        .into_grant(now);
        assert_eq!(grant.expires_at, now + chrono::Duration::seconds(3600));
    }

    #[test]
    fn test_authorize_url_requests_offline_consent() {
        let client = YouTubeClient::new(&YouTubeConfig {
            client_id: Some("cid".to_string()),
            ..Default::default()
        })
        .unwrap();

        let url = client
            .authorize_url("http://localhost:3000/api/youtube/callback", "st")
            .unwrap();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?client_id=cid"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state=st"));
        assert!(url.contains(&*urlencoding::encode(
            "https://www.googleapis.com/auth/youtube.upload"
        )));
    }

    #[test]
    fn test_missing_credentials_is_configuration_error() {
        let client = YouTubeClient::new(&YouTubeConfig::default()).unwrap();
        assert!(matches!(
            client.credentials(),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            client.authorize_url("x", "y"),
            Err(AppError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_youtube_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/channels")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.channel_id("bad").await.unwrap_err();
        assert!(matches!(err, AppError::YouTubeUnauthorized));
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("DELETE", "/videos")
            .match_query(Matcher::UrlEncoded("id".into(), "gone".into()))
            .with_status(404)
            .with_body(r#"{"error":{"code":404,"message":"Video not found"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        match client.delete_video("tok", "gone").await {
            Err(AppError::YouTubeApi { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Video not found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resumable_upload_returns_location() {
        let mut server = mockito::Server::new_async().await;
        let session_url = format!("{}/upload/session/abc", server.url());
        let _m = server
            .mock("POST", "/upload/videos")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("uploadType".into(), "resumable".into()),
                Matcher::UrlEncoded("part".into(), "snippet,status".into()),
            ]))
            .match_header("authorization", "Bearer tok")
            .match_header("x-upload-content-length", "4")
            .with_status(200)
            .with_header("location", &session_url)
            .create_async()
            .await;

        let client = client_for(&server);
        let metadata = VideoMetadata {
            title: "t".to_string(),
            description: String::new(),
            visibility: Visibility::Private,
        };
        let url = client
            .start_resumable_upload("tok", &metadata, "video/mp4", 4)
            .await
            .unwrap();
        assert_eq!(url, session_url);
    }

    #[tokio::test]
    async fn test_refresh_rejection_is_token_refresh_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        match client.refresh_access_token("r").await {
            Err(AppError::TokenRefresh(msg)) => assert!(msg.contains("invalid_grant")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
