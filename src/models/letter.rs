//! Letter model: a message from one partner to the other.

use serde::{Deserialize, Serialize};

/// Letter stored in Firestore (`letters/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Letter {
    /// Also used as document ID
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub is_read: bool,
}
