// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reliving API Server
//!
//! Backend for a two-person journal: vlogs on YouTube, letters, memories
//! and progress.

use reliving::{config::Config, db::FirestoreDb, services::CloudStorage, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Reliving API");

    if config.youtube.client_id.is_none() || config.youtube.client_secret.is_none() {
        tracing::warn!("YouTube client credentials not set; YouTube features will fail");
    }
    if config.youtube.owner_access_token.is_none() && config.youtube.owner_refresh_token.is_none()
    {
        tracing::warn!("Owner YouTube tokens not set; owner vlogs will fail");
    }

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize object storage for memory photos
    let storage = CloudStorage::new(&config.storage_bucket)
        .await
        .expect("Failed to initialize Cloud Storage");

    // Build shared state
    let state = Arc::new(
        AppState::new(config.clone(), db, storage).expect("Failed to initialize services"),
    );

    // Build router
    let app = reliving::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reliving=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
