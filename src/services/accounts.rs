// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Video accounts: where a user's YouTube tokens come from and go to.
//!
//! The owner's tokens are static configuration; refreshed owner tokens live
//! in process memory. The special user's tokens live on their user record
//! and refreshed tokens are written back before use.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::config::YouTubeConfig;
use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{UserType, YouTubeTokens};
use crate::services::youtube::YouTubeClient;

/// Tokens are refreshed when they expire within this margin.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Shared per-user refresh locks.
pub type RefreshLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Access token plus what is needed to renew it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// `None` when the expiry is unknown; such tokens are used until rejected
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_empty()
            || self
                .expires_at
                .is_some_and(|exp| now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= exp)
    }
}

impl From<YouTubeTokens> for StoredToken {
    fn from(tokens: YouTubeTokens) -> Self {
        let expires_at = tokens.expires_at();
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at,
        }
    }
}

impl From<&StoredToken> for YouTubeTokens {
    fn from(token: &StoredToken) -> Self {
        YouTubeTokens::with_expiry(
            token.access_token.clone(),
            token.refresh_token.clone(),
            token.expires_at,
        )
    }
}

/// A YouTube account the app can act on behalf of.
#[async_trait]
pub trait VideoAccount: Send + Sync {
    fn user_id(&self) -> &str;

    fn kind(&self) -> UserType;

    /// Current token, which may be expired.
    async fn access_token(&self) -> Result<StoredToken, AppError>;

    /// Replace `stale_access_token` with a fresh one and persist it.
    ///
    /// If another request already replaced the stale token with a live one,
    /// that token is returned without calling Google.
    async fn refresh(&self, stale_access_token: &str) -> Result<StoredToken, AppError>;

    /// Store tokens for this account.
    async fn persist(&self, token: &StoredToken) -> Result<(), AppError>;
}

/// Refresh with Google, keeping the old refresh token unless it was rotated.
async fn refresh_with_google(
    client: &YouTubeClient,
    user_id: &str,
    refresh_token: &str,
) -> Result<StoredToken, AppError> {
    let grant = client.refresh_access_token(refresh_token).await?;
    let rotated = grant.refresh_token.is_some();

    tracing::info!(
        user_id,
        expires_at = %grant.expires_at,
        rotated,
        "YouTube access token refreshed"
    );

    Ok(StoredToken {
        access_token: grant.access_token,
        refresh_token: grant
            .refresh_token
            .or_else(|| Some(refresh_token.to_string())),
        expires_at: Some(grant.expires_at),
    })
}

/// True if `current` is a live token other than the one that was rejected.
fn superseded(current: &StoredToken, stale_access_token: &str) -> bool {
    current.access_token != stale_access_token && !current.needs_refresh(Utc::now())
}

// ─── Owner ───────────────────────────────────────────────────────────────────

/// Owner account backed by configured tokens.
pub struct StaticAccount {
    user_id: String,
    client: YouTubeClient,
    tokens: Arc<Mutex<Option<StoredToken>>>,
}

#[async_trait]
impl VideoAccount for StaticAccount {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn kind(&self) -> UserType {
        UserType::Owner
    }

    async fn access_token(&self) -> Result<StoredToken, AppError> {
        self.tokens.lock().await.clone().ok_or_else(|| {
            AppError::Configuration("Owner YouTube tokens are not configured".to_string())
        })
    }

    async fn refresh(&self, stale_access_token: &str) -> Result<StoredToken, AppError> {
        let mut tokens = self.tokens.lock().await;

        let refresh_token = match tokens.as_ref() {
            Some(current) if superseded(current, stale_access_token) => {
                return Ok(current.clone());
            }
            Some(StoredToken {
                refresh_token: Some(refresh_token),
                ..
            }) => refresh_token.clone(),
            _ => {
                return Err(AppError::Configuration(
                    "Owner YouTube refresh token is not configured".to_string(),
                ))
            }
        };

        let fresh = refresh_with_google(&self.client, &self.user_id, &refresh_token).await?;
        *tokens = Some(fresh.clone());
        Ok(fresh)
    }

    async fn persist(&self, token: &StoredToken) -> Result<(), AppError> {
        *self.tokens.lock().await = Some(token.clone());
        Ok(())
    }
}

// ─── Special ─────────────────────────────────────────────────────────────────

/// Account whose tokens live on the user record.
pub struct RecordAccount {
    user_id: String,
    client: YouTubeClient,
    db: FirestoreDb,
    refresh_locks: RefreshLocks,
}

impl RecordAccount {
    async fn load(&self) -> Result<StoredToken, AppError> {
        let user = self
            .db
            .get_user(&self.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", self.user_id)))?;

        user.youtube_tokens.map(StoredToken::from).ok_or_else(|| {
            AppError::YouTubeAuthRequired(
                "YouTube not connected. Please connect your YouTube account.".to_string(),
            )
        })
    }

    fn refresh_lock(&self) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry(self.user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Store tokens; the caller holds the refresh lock.
    async fn write_tokens(&self, token: &StoredToken) -> Result<(), AppError> {
        self.db
            .set_youtube_tokens(&self.user_id, &YouTubeTokens::from(token))
            .await
    }
}

#[async_trait]
impl VideoAccount for RecordAccount {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn kind(&self) -> UserType {
        UserType::Special
    }

    async fn access_token(&self) -> Result<StoredToken, AppError> {
        self.load().await
    }

    async fn refresh(&self, stale_access_token: &str) -> Result<StoredToken, AppError> {
        let lock = self.refresh_lock();
        let _guard = lock.lock().await;

        // Another request may have refreshed while we waited.
        let current = self.load().await?;
        if superseded(&current, stale_access_token) {
            tracing::debug!(user_id = %self.user_id, "Reusing token refreshed by another request");
            return Ok(current);
        }

        let refresh_token = current.refresh_token.ok_or_else(|| {
            AppError::YouTubeAuthRequired(
                "No YouTube refresh token stored. Please reconnect your YouTube account."
                    .to_string(),
            )
        })?;

        let fresh = refresh_with_google(&self.client, &self.user_id, &refresh_token).await?;
        self.write_tokens(&fresh).await?;
        Ok(fresh)
    }

    /// Waits for any refresh in flight so the two writes cannot interleave.
    async fn persist(&self, token: &StoredToken) -> Result<(), AppError> {
        let lock = self.refresh_lock();
        let _guard = lock.lock().await;
        self.write_tokens(token).await
    }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// Picks the account implementation for a session.
#[derive(Clone)]
pub struct AccountResolver {
    client: YouTubeClient,
    db: FirestoreDb,
    owner_tokens: Arc<Mutex<Option<StoredToken>>>,
    refresh_locks: RefreshLocks,
}

impl AccountResolver {
    pub fn new(client: YouTubeClient, db: FirestoreDb, config: &YouTubeConfig) -> Self {
        Self {
            client,
            db,
            owner_tokens: Arc::new(Mutex::new(owner_seed(config))),
            refresh_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn for_user(&self, user_id: &str, user_type: UserType) -> Box<dyn VideoAccount> {
        match user_type {
            UserType::Owner => Box::new(StaticAccount {
                user_id: user_id.to_string(),
                client: self.client.clone(),
                tokens: self.owner_tokens.clone(),
            }),
            UserType::Special => Box::new(RecordAccount {
                user_id: user_id.to_string(),
                client: self.client.clone(),
                db: self.db.clone(),
                refresh_locks: self.refresh_locks.clone(),
            }),
        }
    }
}

/// Initial owner token from configuration.
///
/// With only a refresh token configured, the access token is empty so the
/// first call refreshes.
fn owner_seed(config: &YouTubeConfig) -> Option<StoredToken> {
    match (&config.owner_access_token, &config.owner_refresh_token) {
        (None, None) => None,
        (access, refresh) => Some(StoredToken {
            access_token: access.clone().unwrap_or_default(),
            refresh_token: refresh.clone(),
            expires_at: None,
        }),
    }
}
