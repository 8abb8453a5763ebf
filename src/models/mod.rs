// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod letter;
pub mod memory;
pub mod progress;
pub mod user;
pub mod vlog;

pub use letter::Letter;
pub use memory::Memory;
pub use progress::{DailyMood, Mood, Progress};
pub use user::{User, UserType, YouTubeTokens};
pub use vlog::{Visibility, Vlog};
