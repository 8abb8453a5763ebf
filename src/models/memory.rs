//! Memory model: a photo kept in object storage.

use serde::{Deserialize, Serialize};

/// Memory stored in Firestore (`memories/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    /// Also used as document ID
    pub id: String,
    pub user_id: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub created_at: String,
    /// Object name in the storage bucket
    pub filename: String,
}

/// Object name for a new memory photo.
///
/// Path separators and other unsafe characters in the uploaded name are
/// replaced so the object always lands under the user's prefix.
pub fn object_name(user_id: &str, timestamp_millis: i64, file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = if safe.trim_matches('.').is_empty() {
        "photo".to_string()
    } else {
        safe
    };
    format!("memories/{}/{}-{}", user_id, timestamp_millis, safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_keeps_simple_names() {
        assert_eq!(
            object_name("owner-id", 1700000000000, "beach.jpg"),
            "memories/owner-id/1700000000000-beach.jpg"
        );
    }

    #[test]
    fn test_object_name_sanitizes_paths() {
        assert_eq!(
            object_name("owner-id", 1, "../../etc/pass wd.png"),
            "memories/owner-id/1-.._.._etc_pass_wd.png"
        );
        assert_eq!(object_name("owner-id", 1, ".."), "memories/owner-id/1-photo");
    }
}
