// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod executor;
pub mod oauth;
pub mod session;
pub mod storage;
pub mod vlogs;
pub mod youtube;

pub use accounts::{AccountResolver, StoredToken, VideoAccount};
pub use session::SessionIssuer;
pub use storage::CloudStorage;
pub use vlogs::VlogService;
pub use youtube::YouTubeClient;
