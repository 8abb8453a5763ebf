// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! YouTube OAuth handshake helpers.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ring::rand::{SecureRandom, SystemRandom};
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::services::accounts::{StoredToken, VideoAccount};
use crate::services::youtube::YouTubeClient;

/// Cookie holding the handshake state between redirect and callback.
pub const OAUTH_STATE_COOKIE: &str = "youtube_oauth_state";

/// Lifetime of the state cookie.
pub const OAUTH_STATE_TTL_SECS: i64 = 10 * 60;

/// 256 bits of randomness, URL-safe base64.
pub fn generate_state() -> Result<String, AppError> {
    let mut bytes = [0u8; 32];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("system RNG failure")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Constant-time comparison of the returned state with the cookie.
pub fn states_match(expected: &str, received: &str) -> bool {
    !expected.is_empty() && bool::from(expected.as_bytes().ct_eq(received.as_bytes()))
}

/// Exchange the authorization code and store the tokens on the account.
///
/// Google omits the refresh token when the user had already consented; the
/// previously stored one is kept in that case.
pub async fn complete_authorization(
    client: &YouTubeClient,
    account: &dyn VideoAccount,
    code: &str,
    redirect_uri: &str,
) -> Result<StoredToken, AppError> {
    let grant = client.exchange_code(code, redirect_uri).await?;

    let refresh_token = match grant.refresh_token {
        Some(token) => Some(token),
        None => {
            tracing::warn!(
                user_id = account.user_id(),
                "Code exchange returned no refresh token, keeping stored one"
            );
            account
                .access_token()
                .await
                .ok()
                .and_then(|t| t.refresh_token)
        }
    };

    let token = StoredToken {
        access_token: grant.access_token,
        refresh_token,
        expires_at: Some(grant.expires_at),
    };

    account.persist(&token).await?;

    tracing::info!(
        user_id = account.user_id(),
        has_refresh_token = token.refresh_token.is_some(),
        "YouTube account connected"
    );

    Ok(token)
}
