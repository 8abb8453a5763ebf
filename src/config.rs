// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Secrets are read once at startup and kept in memory. YouTube credentials
//! are optional at startup; a missing credential only fails the request that
//! needs it.

use std::env;

/// Default request body limit: 512 MiB covers a phone-recorded vlog.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Upstream endpoints used for the YouTube Data API and Google OAuth.
#[derive(Debug, Clone)]
pub struct YouTubeEndpoints {
    /// Base for Data API resources (`/channels`, `/videos`, ...)
    pub api_base: String,
    /// Base for media uploads (`/videos`, `/thumbnails/set`)
    pub upload_base: String,
    /// OAuth token endpoint (code exchange and refresh)
    pub token_url: String,
    /// OAuth consent screen
    pub auth_url: String,
}

impl Default for YouTubeEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            upload_base: "https://www.googleapis.com/upload/youtube/v3".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
        }
    }
}

impl YouTubeEndpoints {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: env::var("YOUTUBE_API_BASE").unwrap_or(defaults.api_base),
            upload_base: env::var("YOUTUBE_UPLOAD_BASE").unwrap_or(defaults.upload_base),
            token_url: env::var("GOOGLE_TOKEN_URL").unwrap_or(defaults.token_url),
            auth_url: env::var("GOOGLE_AUTH_URL").unwrap_or(defaults.auth_url),
        }
    }
}

/// YouTube OAuth app and owner credentials.
#[derive(Debug, Clone, Default)]
pub struct YouTubeConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Data API key, appended as `key=` when present
    pub api_key: Option<String>,
    /// Long-lived owner access token
    pub owner_access_token: Option<String>,
    /// Long-lived owner refresh token
    pub owner_refresh_token: Option<String>,
    pub endpoints: YouTubeEndpoints,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Public app URL; OAuth redirect URIs and error pages hang off it
    pub app_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Cloud Storage bucket for memory photos
    pub storage_bucket: String,
    /// Server port
    pub port: u16,
    /// Request body limit for multipart uploads
    pub max_upload_bytes: usize,
    /// Fixed identity of the owner account
    pub owner_user_id: String,
    /// Fixed identity of the special account
    pub special_user_id: String,

    // --- Secrets ---
    /// Shared secret that logs in as the owner
    pub owner_key: String,
    /// Shared secret that logs in as the special user
    pub special_key: String,
    /// HS256 signing key for session tokens (raw bytes)
    pub session_signing_key: Vec<u8>,
    pub youtube: YouTubeConfig,
}

impl Config {
    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            app_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            storage_bucket: "test-bucket".to_string(),
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            owner_user_id: "owner-id".to_string(),
            special_user_id: "special-id".to_string(),
            owner_key: "owner-secret".to_string(),
            special_key: "special-secret".to_string(),
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
            youtube: YouTubeConfig {
                client_id: Some("test_client_id".to_string()),
                client_secret: Some("test_client_secret".to_string()),
                api_key: None,
                owner_access_token: Some("owner_static_access".to_string()),
                owner_refresh_token: Some("owner_static_refresh".to_string()),
                endpoints: YouTubeEndpoints::default(),
            },
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let gcp_project_id =
            env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string());
        let storage_bucket = env::var("STORAGE_BUCKET")
            .unwrap_or_else(|_| format!("{}.appspot.com", gcp_project_id));

        Ok(Self {
            app_url: env::var("PUBLIC_APP_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id,
            storage_bucket,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            owner_user_id: env::var("OWNER_USER_ID").unwrap_or_else(|_| "owner-id".to_string()),
            special_user_id: env::var("SPECIAL_USER_ID")
                .unwrap_or_else(|_| "special-id".to_string()),

            owner_key: required_secret("OWNER_KEY")?,
            special_key: required_secret("SPECIAL_KEY")?,
            session_signing_key: required_secret("SESSION_SIGNING_KEY")?.into_bytes(),
            youtube: YouTubeConfig {
                client_id: optional_secret("YOUTUBE_CLIENT_ID"),
                client_secret: optional_secret("YOUTUBE_CLIENT_SECRET"),
                api_key: optional_secret("YOUTUBE_API_KEY"),
                owner_access_token: optional_secret("OWNER_YOUTUBE_ACCESS_TOKEN"),
                owner_refresh_token: optional_secret("OWNER_YOUTUBE_REFRESH_TOKEN"),
                endpoints: YouTubeEndpoints::from_env(),
            },
        })
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.app_url.starts_with("https://")
    }

    /// OAuth redirect URI registered with Google.
    pub fn youtube_redirect_uri(&self) -> String {
        format!("{}/api/youtube/callback", self.app_url)
    }
}

fn required_secret(name: &'static str) -> Result<String, ConfigError> {
    optional_secret(name).ok_or(ConfigError::Missing(name))
}

/// Read a secret, treating blank values as unset.
fn optional_secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
