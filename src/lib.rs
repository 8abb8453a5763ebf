// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Reliving: a private journal for two.
//!
//! This crate provides the backend API: shared-secret login, vlogs kept on
//! each user's YouTube channel, letters between the pair, photo memories
//! and a small progress tracker.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{AccountResolver, CloudStorage, SessionIssuer, VlogService, YouTubeClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub storage: CloudStorage,
    pub sessions: SessionIssuer,
    pub youtube: YouTubeClient,
    pub accounts: AccountResolver,
    pub vlogs: VlogService,
}

impl AppState {
    /// Wire services from configuration and already-connected backends.
    pub fn new(config: Config, db: FirestoreDb, storage: CloudStorage) -> anyhow::Result<Self> {
        let youtube = YouTubeClient::new(&config.youtube)?;
        let accounts = AccountResolver::new(youtube.clone(), db.clone(), &config.youtube);

        Ok(Self {
            sessions: SessionIssuer::new(&config.session_signing_key),
            vlogs: VlogService::new(youtube.clone()),
            accounts,
            youtube,
            config,
            db,
            storage,
        })
    }
}
