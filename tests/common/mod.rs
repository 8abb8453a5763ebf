// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use reliving::config::{Config, YouTubeEndpoints};
use reliving::db::FirestoreDb;
use reliving::models::UserType;
use reliving::routes::create_router;
use reliving::services::CloudStorage;
use reliving::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Unique ID for test isolation in the shared emulator.
#[allow(dead_code)]
pub fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

/// Test configuration with all YouTube/Google endpoints on a mock server.
#[allow(dead_code)]
pub fn config_for_server(server_url: &str) -> Config {
    let mut config = Config::test_default();
    config.youtube.endpoints = YouTubeEndpoints {
        api_base: server_url.to_string(),
        upload_base: format!("{}/upload", server_url),
        token_url: format!("{}/token", server_url),
        auth_url: format!("{}/auth", server_url),
    };
    config
}

/// Build an app from a configuration and database; storage is offline.
#[allow(dead_code)]
pub fn create_app(config: Config, db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(
        AppState::new(config, db, CloudStorage::new_mock()).expect("Failed to build state"),
    );
    (create_router(state.clone()), state)
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_app(Config::test_default(), test_db_offline())
}

/// Session token for a user.
#[allow(dead_code)]
pub fn session_for(state: &AppState, user_id: &str, user_type: UserType) -> String {
    state
        .sessions
        .issue(user_id, user_type)
        .expect("Failed to issue session")
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

/// Encode a multipart/form-data body. Each part is
/// `(name, Some((file_name, content_type)), bytes)` for files or
/// `(name, None, bytes)` for text fields.
#[allow(dead_code)]
pub fn multipart_body(
    boundary: &str,
    parts: &[(&str, Option<(&str, &str)>, &[u8])],
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}
