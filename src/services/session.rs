// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity: shared-secret login and signed session tokens.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::error::AppError;
use crate::models::UserType;

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "auth-token";

/// Session lifetime.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Session token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// User ID
    pub sub: String,
    pub user_type: UserType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionIssuer {
    pub fn new(signing_key: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(signing_key),
            decoding: DecodingKey::from_secret(signing_key),
        }
    }

    pub fn issue(&self, user_id: &str, user_type: UserType) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        self.issue_with_times(user_id, user_type, now, now + SESSION_TTL_SECS)
    }

    /// Sign claims with explicit timestamps.
    pub fn issue_with_times(
        &self,
        user_id: &str,
        user_type: UserType,
        iat: i64,
        exp: i64,
    ) -> Result<String, AppError> {
        let claims = SessionClaims {
            sub: user_id.to_string(),
            user_type,
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign session: {}", e)))
    }

    /// Verify a token. Expired tokens are reported separately so the client
    /// can tell "log in again" from "not logged in".
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::Unauthorized,
            })
    }
}

/// Match a login key against the configured secrets in constant time.
pub fn identify_key(config: &Config, key: &str) -> Option<(String, UserType)> {
    let key = key.trim().as_bytes();
    if key.is_empty() {
        return None;
    }

    let is_owner: bool = key.ct_eq(config.owner_key.as_bytes()).into();
    let is_special: bool = key.ct_eq(config.special_key.as_bytes()).into();

    if is_owner {
        Some((config.owner_user_id.clone(), UserType::Owner))
    } else if is_special {
        Some((config.special_user_id.clone(), UserType::Special))
    } else {
        None
    }
}

/// The other member of the pair.
pub fn partner_of(config: &Config, user_id: &str) -> Option<(String, UserType)> {
    if user_id == config.owner_user_id {
        Some((config.special_user_id.clone(), UserType::Special))
    } else if user_id == config.special_user_id {
        Some((config.owner_user_id.clone(), UserType::Owner))
    } else {
        None
    }
}
