// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Memories: photos with an optional caption.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::memory::object_name;
use crate::models::Memory;
use crate::time_utils::now_rfc3339;
use crate::AppState;

const MAX_CAPTION_CHARS: usize = 500;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/memories", get(list_memories).post(upload_memory))
        .route("/api/memories/{id}", delete(delete_memory))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    user_id: Option<String>,
}

async fn list_memories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Memory>>> {
    let memories = state.db.list_memories(params.user_id.as_deref()).await?;
    Ok(Json(memories))
}

/// Store a photo, then its metadata.
async fn upload_memory(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Memory>)> {
    let mut image = None;
    let mut caption = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("photo").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid image: {}", e)))?;
                image = Some((file_name, content_type, bytes));
            }
            "caption" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid caption: {}", e)))?;
                let text = text.trim().to_string();
                if !text.is_empty() {
                    caption = Some(text);
                }
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        image.ok_or_else(|| AppError::BadRequest("image file is required".to_string()))?;
    if bytes.is_empty() || !content_type.starts_with("image/") {
        return Err(AppError::BadRequest("image must be a non-empty image file".to_string()));
    }
    if caption
        .as_ref()
        .is_some_and(|c: &String| c.chars().count() > MAX_CAPTION_CHARS)
    {
        return Err(AppError::BadRequest(format!(
            "caption must be at most {} characters",
            MAX_CAPTION_CHARS
        )));
    }

    let filename = object_name(
        &user.user_id,
        chrono::Utc::now().timestamp_millis(),
        &file_name,
    );
    let image_url = state.storage.upload(&filename, &content_type, bytes).await?;

    let memory = Memory {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.user_id.clone(),
        image_url,
        caption,
        created_at: now_rfc3339(),
        filename,
    };
    state.db.create_memory(&memory).await?;

    tracing::info!(memory_id = %memory.id, user_id = %user.user_id, "Memory saved");
    Ok((StatusCode::CREATED, Json(memory)))
}

/// Delete a memory. Only the user who added it may do this.
async fn delete_memory(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let memory = state
        .db
        .get_memory(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Memory {} not found", id)))?;

    if memory.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    state.storage.delete(&memory.filename).await?;
    state.db.delete_memory(&id).await?;

    tracing::info!(memory_id = %id, user_id = %user.user_id, "Memory deleted");
    Ok(StatusCode::NO_CONTENT)
}
