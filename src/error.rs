// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Session token expired")]
    TokenExpired,

    #[error("Not allowed to access this resource")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// YouTube answered 401 for the presented access token.
    #[error("YouTube rejected the access token")]
    YouTubeUnauthorized,

    /// The account has no usable YouTube credentials; the user must reconnect.
    #[error("YouTube authentication required: {0}")]
    YouTubeAuthRequired(String),

    #[error("Failed to refresh YouTube access token: {0}")]
    TokenRefresh(String),

    #[error("YouTube API error (HTTP {status}): {message}")]
    YouTubeApi { status: u16, message: String },

    #[error("Server configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for every error that means "reconnect YouTube".
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            AppError::YouTubeUnauthorized
                | AppError::YouTubeAuthRequired(_)
                | AppError::TokenRefresh(_)
        )
    }
}

/// JSON error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_expired: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reauth_required: Option<bool>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let reauth_required = self.requires_reauth().then_some(true);
        let token_expired = matches!(self, AppError::TokenExpired).then_some(true);

        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "token_expired", None),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::YouTubeUnauthorized | AppError::YouTubeAuthRequired(_) => (
                StatusCode::UNAUTHORIZED,
                "youtube_auth_required",
                Some(self.to_string()),
            ),
            AppError::TokenRefresh(msg) => {
                tracing::warn!(error = %msg, "YouTube token refresh failed");
                (
                    StatusCode::UNAUTHORIZED,
                    "token_refresh_failed",
                    Some(self.to_string()),
                )
            }
            AppError::YouTubeApi { status, .. } => {
                let code = if *status == 404 {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (code, "youtube_error", Some(self.to_string()))
            }
            AppError::Configuration(msg) => {
                tracing::error!(error = %msg, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    Some(msg.clone()),
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (StatusCode::BAD_GATEWAY, "storage_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            token_expired,
            reauth_required,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
