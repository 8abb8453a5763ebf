//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::{format_utc_rfc3339, parse_rfc3339};

/// The two fixed identities the app supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// YouTube tokens come from static configuration
    Owner,
    /// YouTube tokens come from the user record
    Special,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Owner => "owner",
            UserType::Special => "special",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User profile stored in Firestore (`users/{userId}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Also used as document ID
    pub user_id: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    /// Connected YouTube account, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_tokens: Option<YouTubeTokens>,
    pub created_at: String,
    pub last_login_at: String,
}

/// YouTube OAuth tokens as persisted on the user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the access token expires (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
}

impl YouTubeTokens {
    /// Parsed expiry; `None` when unknown or unparseable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry_date.as_deref().and_then(parse_rfc3339)
    }

    pub fn with_expiry(
        access_token: String,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expiry_date: expires_at.map(format_utc_rfc3339),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_document_shape() {
        let user = User {
            user_id: "special-id".to_string(),
            user_type: UserType::Special,
            youtube_tokens: Some(YouTubeTokens {
                access_token: "a".to_string(),
                refresh_token: Some("r".to_string()),
                expiry_date: Some("2025-01-01T00:00:00Z".to_string()),
            }),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            last_login_at: "2024-01-02T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["type"], "special");
        assert_eq!(json["youtubeTokens"]["refreshToken"], "r");
        assert_eq!(json["lastLoginAt"], "2024-01-02T00:00:00Z");
    }

    #[test]
    fn test_user_without_tokens_deserializes() {
        let user: User = serde_json::from_value(serde_json::json!({
            "userId": "owner-id",
            "type": "owner",
            "createdAt": "2024-01-01T00:00:00Z",
            "lastLoginAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(user.user_type, UserType::Owner);
        assert!(user.youtube_tokens.is_none());
    }

    #[test]
    fn test_unparseable_expiry_is_unknown() {
        let tokens = YouTubeTokens {
            access_token: "a".to_string(),
            refresh_token: None,
            expiry_date: Some("soon".to_string()),
        };
        assert!(tokens.expires_at().is_none());
    }
}
