//! Letters between the two users.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Letter, UserType};
use crate::services::session::partner_of;
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/letters", get(list_letters).post(send_letter))
        .route("/api/letters/received", get(received_letters))
        .route("/api/letters/sent", get(sent_letters))
        .route("/api/letters/unread-count", get(unread_count))
        .route("/api/letters/{id}/read", post(mark_read))
        .route("/api/partner", get(get_partner))
}

#[derive(Deserialize, Validate)]
pub struct SendLetterRequest {
    #[validate(length(min = 1, max = 10000))]
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerResponse {
    pub user_id: String,
    pub user_type: UserType,
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: usize,
}

fn partner(state: &AppState, user: &AuthUser) -> Result<(String, UserType)> {
    partner_of(&state.config, &user.user_id)
        .ok_or_else(|| AppError::NotFound("No partner for this user".to_string()))
}

/// Send a letter to the partner.
async fn send_letter(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SendLetterRequest>,
) -> Result<(StatusCode, Json<Letter>)> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest("content must not be blank".to_string()));
    }

    let (to_user_id, _) = partner(&state, &user)?;

    let letter = Letter {
        id: uuid::Uuid::new_v4().to_string(),
        from_user_id: user.user_id.clone(),
        to_user_id,
        content: req.content,
        created_at: now_rfc3339(),
        is_read: false,
    };

    state.db.create_letter(&letter).await?;
    tracing::info!(
        letter_id = %letter.id,
        from = %letter.from_user_id,
        to = %letter.to_user_id,
        "Letter sent"
    );

    Ok((StatusCode::CREATED, Json(letter)))
}

/// Every letter the caller sent or received, newest first.
async fn list_letters(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Letter>>> {
    let letters = state
        .db
        .list_letters()
        .await?
        .into_iter()
        .filter(|l| l.from_user_id == user.user_id || l.to_user_id == user.user_id)
        .collect();
    Ok(Json(letters))
}

async fn received_letters(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Letter>>> {
    Ok(Json(state.db.letters_received(&user.user_id).await?))
}

async fn sent_letters(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Letter>>> {
    Ok(Json(state.db.letters_sent(&user.user_id).await?))
}

async fn unread_count(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UnreadCountResponse>> {
    let count = state.db.count_unread_letters(&user.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Mark a letter read. Only its recipient may do this.
async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let letter = state
        .db
        .get_letter(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Letter {} not found", id)))?;

    if letter.to_user_id != user.user_id {
        tracing::warn!(
            letter_id = %id,
            user_id = %user.user_id,
            "Non-recipient tried to mark letter read"
        );
        return Err(AppError::Forbidden);
    }

    state.db.mark_letter_read(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_partner(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PartnerResponse>> {
    let (user_id, user_type) = partner(&state, &user)?;
    Ok(Json(PartnerResponse { user_id, user_type }))
}
