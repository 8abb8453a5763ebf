// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared-secret login and session routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::UserType;
use crate::services::session::{identify_key, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", post(verify))
        .route("/api/auth/logout", post(logout))
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 256))]
    key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_type: UserType,
}

/// Session cookie with the attributes used for both setting and clearing it.
fn session_cookie(config: &Config, value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.secure_cookies())
        .max_age(time::Duration::seconds(SESSION_TTL_SECS))
        .build()
}

/// Exchange a shared secret for a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    req.validate()
        .map_err(|_| AppError::BadRequest("key is required".to_string()))?;

    let (user_id, user_type) = identify_key(&state.config, &req.key).ok_or_else(|| {
        tracing::warn!("Login attempt with unknown key");
        AppError::Unauthorized
    })?;

    state.db.record_login(&user_id, user_type).await?;
    let token = state.sessions.issue(&user_id, user_type)?;

    tracing::info!(user_id = %user_id, user_type = %user_type, "User logged in");

    let jar = jar.add(session_cookie(&state.config, token.clone()));
    Ok((jar, Json(LoginResponse { token, user_type })))
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
}

/// Report whether a session token is valid.
async fn verify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyRequest>,
) -> Json<VerifyResponse> {
    match state.sessions.verify(&req.token) {
        Ok(claims) => Json(VerifyResponse {
            valid: true,
            user_id: Some(claims.sub),
            user_type: Some(claims.user_type),
        }),
        Err(_) => Json(VerifyResponse {
            valid: false,
            user_id: None,
            user_type: None,
        }),
    }
}

/// Clear the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(session_cookie(&state.config, String::new()));
    (jar, StatusCode::NO_CONTENT)
}
