// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vlog routes: list, view, upload, edit and delete videos on the caller's
//! YouTube account.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::vlog::watch_url;
use crate::models::{Visibility, Vlog};
use crate::services::vlogs::MediaPart;
use crate::services::youtube::VideoMetadata;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/vlogs", get(list_vlogs).post(upload_vlog))
        .route(
            "/api/vlogs/{id}",
            get(get_vlog).put(update_vlog).delete(delete_vlog),
        )
}

/// Multipart fields shared by upload and edit.
#[derive(Debug, Default, Validate)]
struct VlogForm {
    #[validate(length(min = 1, max = 100))]
    title: String,
    #[validate(length(max = 5000))]
    description: String,
    visibility: Option<Visibility>,
    video: Option<MediaPart>,
    thumbnail: Option<MediaPart>,
}

impl VlogForm {
    async fn parse(mut multipart: Multipart) -> Result<Self> {
        let mut form = VlogForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "title" | "description" | "visibility" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid {}: {}", name, e)))?;
                    match name.as_str() {
                        "title" => form.title = text.trim().to_string(),
                        "description" => form.description = text,
                        _ => {
                            form.visibility =
                                Some(text.parse().map_err(AppError::BadRequest)?)
                        }
                    }
                }
                "video" | "thumbnail" => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid {}: {}", name, e)))?;
                    if bytes.is_empty() {
                        continue;
                    }
                    let part = MediaPart {
                        content_type,
                        bytes,
                    };
                    if name == "video" {
                        form.video = Some(part);
                    } else {
                        form.thumbnail = Some(part);
                    }
                }
                other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
            }
        }

        form.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if let Some(thumbnail) = &form.thumbnail {
            if !thumbnail.content_type.starts_with("image/") {
                return Err(AppError::BadRequest(
                    "thumbnail must be an image".to_string(),
                ));
            }
        }

        Ok(form)
    }

    fn metadata(&self, visibility: Visibility) -> VideoMetadata {
        VideoMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
            visibility,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedVlogResponse {
    pub id: String,
    pub url: String,
    /// Absent when no thumbnail was sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_set: Option<bool>,
}

async fn list_vlogs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Vlog>>> {
    let account = state.accounts.for_user(&user.user_id, user.user_type);
    let vlogs = state.vlogs.list_vlogs(account.as_ref()).await?;
    Ok(Json(vlogs))
}

async fn get_vlog(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vlog>> {
    let account = state.accounts.for_user(&user.user_id, user.user_type);
    let vlog = state.vlogs.get_vlog(account.as_ref(), &id).await?;
    Ok(Json(vlog))
}

async fn upload_vlog(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SavedVlogResponse>)> {
    let mut form = VlogForm::parse(multipart).await?;

    let video = form
        .video
        .take()
        .ok_or_else(|| AppError::BadRequest("video file is required".to_string()))?;
    if !video.content_type.starts_with("video/") {
        return Err(AppError::BadRequest("video must be a video file".to_string()));
    }

    let account = state.accounts.for_user(&user.user_id, user.user_type);
    let saved = state
        .vlogs
        .upload_vlog(
            account.as_ref(),
            &form.metadata(form.visibility.unwrap_or_default()),
            video,
            form.thumbnail.take(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SavedVlogResponse {
            url: watch_url(&saved.video_id),
            id: saved.video_id,
            thumbnail_set: saved.thumbnail_set,
        }),
    ))
}

async fn update_vlog(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<SavedVlogResponse>> {
    let mut form = VlogForm::parse(multipart).await?;

    // YouTube replaces privacyStatus on every update, so an edit must say it.
    let visibility = form
        .visibility
        .ok_or_else(|| AppError::BadRequest("visibility is required".to_string()))?;

    let account = state.accounts.for_user(&user.user_id, user.user_type);
    let saved = state
        .vlogs
        .update_vlog(
            account.as_ref(),
            &id,
            &form.metadata(visibility),
            form.thumbnail.take(),
        )
        .await?;

    Ok(Json(SavedVlogResponse {
        url: watch_url(&saved.video_id),
        id: saved.video_id,
        thumbnail_set: saved.thumbnail_set,
    }))
}

async fn delete_vlog(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let account = state.accounts.for_user(&user.user_id, user.user_type);
    state.vlogs.delete_vlog(account.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
