// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile, login bookkeeping, YouTube tokens)
//! - Letters
//! - Memories (photo metadata; the bytes live in object storage)
//! - Progress

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Letter, Memory, Progress, User, UserType, YouTubeTokens};
use crate::time_utils::now_rfc3339;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a user document.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Record a successful login: create the user on first login, otherwise
    /// bump `lastLoginAt`. Existing YouTube tokens are preserved.
    pub async fn record_login(&self, user_id: &str, user_type: UserType) -> Result<User, AppError> {
        let now = now_rfc3339();

        match self.get_user(user_id).await? {
            Some(mut existing) => {
                existing.user_type = user_type;
                existing.last_login_at = now;
                self.touch_user(&existing).await?;
                Ok(existing)
            }
            None => {
                tracing::info!(user_id, user_type = %user_type, "Creating user on first login");
                let user = User {
                    user_id: user_id.to_string(),
                    user_type,
                    youtube_tokens: None,
                    created_at: now.clone(),
                    last_login_at: now,
                };
                self.upsert_user(&user).await?;
                Ok(user)
            }
        }
    }

    /// Write only `type` and `lastLoginAt`. Tokens in `user` are ignored, so
    /// a stale copy cannot overwrite a concurrent token refresh.
    pub async fn touch_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(["type", "lastLoginAt"])
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Replace the YouTube tokens on a user record, leaving other fields.
    ///
    /// Callers serialize concurrent writes per user.
    pub async fn set_youtube_tokens(
        &self,
        user_id: &str,
        tokens: &YouTubeTokens,
    ) -> Result<(), AppError> {
        let mut user = self
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        user.youtube_tokens = Some(tokens.clone());

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(["youtubeTokens"])
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(&user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Letter Operations ───────────────────────────────────────

    pub async fn create_letter(&self, letter: &Letter) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::LETTERS)
            .document_id(&letter.id)
            .object(letter)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn get_letter(&self, letter_id: &str) -> Result<Option<Letter>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::LETTERS)
            .obj()
            .one(letter_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All letters, newest first.
    pub async fn list_letters(&self) -> Result<Vec<Letter>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::LETTERS)
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Letters where `field` equals `user_id`, newest first.
    ///
    /// Sorted in memory so the query needs no composite index.
    async fn letters_by(&self, field: &str, user_id: &str) -> Result<Vec<Letter>, AppError> {
        let mut letters: Vec<Letter> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::LETTERS)
            .filter(|q| q.for_all([q.field(field).eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        letters.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(letters)
    }

    pub async fn letters_received(&self, user_id: &str) -> Result<Vec<Letter>, AppError> {
        self.letters_by("toUserId", user_id).await
    }

    pub async fn letters_sent(&self, user_id: &str) -> Result<Vec<Letter>, AppError> {
        self.letters_by("fromUserId", user_id).await
    }

    pub async fn count_unread_letters(&self, user_id: &str) -> Result<usize, AppError> {
        let unread: Vec<Letter> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::LETTERS)
            .filter(|q| {
                q.for_all([
                    q.field("toUserId").eq(user_id),
                    q.field("isRead").eq(false),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(unread.len())
    }

    pub async fn mark_letter_read(&self, letter_id: &str) -> Result<(), AppError> {
        let mut letter = self
            .get_letter(letter_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Letter {} not found", letter_id)))?;

        if letter.is_read {
            return Ok(());
        }
        letter.is_read = true;
        self.create_letter(&letter).await
    }

    // ─── Memory Operations ───────────────────────────────────────

    pub async fn create_memory(&self, memory: &Memory) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MEMORIES)
            .document_id(&memory.id)
            .object(memory)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn get_memory(&self, memory_id: &str) -> Result<Option<Memory>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MEMORIES)
            .obj()
            .one(memory_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Memories, newest first, optionally restricted to one user.
    pub async fn list_memories(&self, user_id: Option<&str>) -> Result<Vec<Memory>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MEMORIES);

        let query = match user_id {
            Some(user_id) => query.filter(|q| q.for_all([q.field("userId").eq(user_id)])),
            None => query,
        };

        let mut memories: Vec<Memory> = query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        memories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(memories)
    }

    pub async fn delete_memory(&self, memory_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::MEMORIES)
            .document_id(memory_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Progress Operations ─────────────────────────────────────

    pub async fn get_progress(&self, user_id: &str) -> Result<Option<Progress>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROGRESS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_progress(&self, progress: &Progress) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROGRESS)
            .document_id(&progress.user_id)
            .object(progress)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
