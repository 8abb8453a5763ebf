//! Progress tracker routes.

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Mood, Progress};
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/progress", get(get_progress).put(update_progress))
        .route("/api/progress/moods", post(record_mood))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    smoke_free_streak: u32,
    #[validate(range(min = 0.0))]
    money_saved: f64,
}

#[derive(Deserialize)]
pub struct RecordMoodRequest {
    /// `YYYY-MM-DD`
    date: String,
    mood: Mood,
}

async fn load(state: &AppState, user_id: &str) -> Result<Progress> {
    Ok(state
        .db
        .get_progress(user_id)
        .await?
        .unwrap_or_else(|| Progress::empty(user_id)))
}

async fn get_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Progress>> {
    Ok(Json(load(&state, &user.user_id).await?))
}

async fn update_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProgressRequest>,
) -> Result<Json<Progress>> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut progress = load(&state, &user.user_id).await?;
    progress.smoke_free_streak = req.smoke_free_streak;
    progress.money_saved = req.money_saved;
    progress.last_updated = now_rfc3339();

    state.db.set_progress(&progress).await?;
    Ok(Json(progress))
}

/// Record today's (or any day's) mood; one entry per date.
async fn record_mood(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<RecordMoodRequest>,
) -> Result<Json<Progress>> {
    chrono::NaiveDate::parse_from_str(&req.date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("date must be YYYY-MM-DD".to_string()))?;

    let mut progress = load(&state, &user.user_id).await?;
    progress.record_mood(&req.date, req.mood);
    progress.last_updated = now_rfc3339();

    state.db.set_progress(&progress).await?;
    Ok(Json(progress))
}
