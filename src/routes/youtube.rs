// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! YouTube connection routes: OAuth handshake, token refresh and status.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::auth::{session_token, AuthUser};
use crate::models::UserType;
use crate::services::oauth::{
    complete_authorization, generate_state, states_match, OAUTH_STATE_COOKIE,
    OAUTH_STATE_TTL_SECS,
};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

/// Handshake routes; the callback checks the session itself.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/youtube/auth", get(auth_start))
        .route("/api/youtube/callback", get(auth_callback))
}

/// Routes that require a session.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/youtube/refresh", post(refresh_token))
        .route("/api/users/{user_id}/youtube-status", get(youtube_status))
}

fn state_cookie(config: &Config, value: String) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.secure_cookies())
        .max_age(time::Duration::seconds(OAUTH_STATE_TTL_SECS))
        .build()
}

fn error_redirect(config: &Config, message: &str) -> Redirect {
    Redirect::temporary(&format!(
        "{}/error?message={}",
        config.app_url,
        urlencoding::encode(message)
    ))
}

/// Start the handshake: set the state cookie and send the user to Google.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let oauth_state = generate_state()?;
    let auth_url = state
        .youtube
        .authorize_url(&state.config.youtube_redirect_uri(), &oauth_state)?;

    tracing::info!("Starting YouTube OAuth flow, redirecting to Google");

    let jar = jar.add(state_cookie(&state.config, oauth_state));
    Ok((jar, Redirect::temporary(&auth_url)))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback. Always redirects: to the vlogs page on success, to the
/// error page otherwise. The state cookie is cleared either way.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let expected_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let session = session_token(&jar, &headers);
    let jar = jar.remove(state_cookie(&state.config, String::new()));

    let redirect = match connect_account(
        &state,
        params,
        expected_state.as_deref(),
        session.as_deref(),
    )
    .await
    {
        Ok(user_id) => {
            tracing::info!(user_id = %user_id, "YouTube OAuth completed");
            Redirect::temporary(&format!(
                "{}/vlogs?youtube_connected=true",
                state.config.app_url
            ))
        }
        Err(message) => {
            tracing::warn!(reason = %message, "YouTube OAuth callback rejected");
            error_redirect(&state.config, &message)
        }
    };

    (jar, redirect)
}

/// Callback checks in order; the first failure short-circuits with a
/// user-facing message. Returns the connected user's ID.
async fn connect_account(
    state: &AppState,
    params: CallbackParams,
    expected_state: Option<&str>,
    session: Option<&str>,
) -> std::result::Result<String, String> {
    if let Some(error) = params.error {
        return Err(format!("YouTube authorization failed: {}", error));
    }

    let (Some(code), Some(received_state)) = (params.code, params.state) else {
        return Err("Missing authorization code or state".to_string());
    };

    match expected_state {
        Some(expected) if states_match(expected, &received_state) => {}
        _ => return Err("Invalid OAuth state. Please try connecting again.".to_string()),
    }

    let claims = session
        .and_then(|token| state.sessions.verify(token).ok())
        .ok_or_else(|| "Please log in before connecting YouTube".to_string())?;

    if claims.user_type == UserType::Owner {
        return Err("The owner account uses a permanent YouTube connection".to_string());
    }

    if state.youtube.credentials().is_err() {
        return Err("YouTube is not configured on this server".to_string());
    }

    let account = state.accounts.for_user(&claims.sub, claims.user_type);
    complete_authorization(
        &state.youtube,
        account.as_ref(),
        &code,
        &state.config.youtube_redirect_uri(),
    )
    .await
    .map_err(|e| {
        tracing::error!(
            user_id = %claims.sub,
            error = %e,
            "Failed to complete YouTube authorization"
        );
        "Failed to connect your YouTube account".to_string()
    })?;

    Ok(claims.sub)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub refreshed: bool,
    pub expiry_date: Option<String>,
}

/// Refresh the caller's YouTube access token now.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RefreshResponse>> {
    let account = state.accounts.for_user(&user.user_id, user.user_type);
    let current = account.access_token().await?;
    let fresh = account.refresh(&current.access_token).await?;

    Ok(Json(RefreshResponse {
        refreshed: true,
        expiry_date: fresh.expires_at.map(format_utc_rfc3339),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeStatusResponse {
    pub is_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    pub user_type: UserType,
}

/// Whether a user's YouTube account is connected. Users may only ask about
/// themselves.
async fn youtube_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<YouTubeStatusResponse>> {
    if user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let record = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    let response = match record.user_type {
        UserType::Owner => YouTubeStatusResponse {
            is_connected: true,
            expiry_date: None,
            user_type: UserType::Owner,
        },
        UserType::Special => {
            let tokens = record
                .youtube_tokens
                .filter(|t| !t.access_token.is_empty());
            YouTubeStatusResponse {
                is_connected: tokens.is_some(),
                expiry_date: tokens.and_then(|t| t.expiry_date),
                user_type: UserType::Special,
            }
        }
    };

    Ok(Json(response))
}
