//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// User profiles, keyed by user ID (holds YouTube tokens)
    pub const USERS: &str = "users";
    pub const LETTERS: &str = "letters";
    pub const MEMORIES: &str = "memories";
    /// Progress tracker, keyed by user ID
    pub const PROGRESS: &str = "progress";
}
