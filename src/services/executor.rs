//! Run a YouTube call with a valid token, refreshing at most once.

use std::future::Future;

use chrono::Utc;

use crate::error::AppError;
use crate::services::accounts::VideoAccount;

/// Run `call` with the account's access token.
///
/// A token inside the expiry margin is refreshed before the call. If YouTube
/// rejects the token and no refresh has happened yet, the token is refreshed
/// and the call retried once. A second rejection means the user has to
/// reconnect.
pub async fn call_with_refresh<T, F, Fut>(
    account: &dyn VideoAccount,
    op: &'static str,
    mut call: F,
) -> Result<T, AppError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut token = account.access_token().await?;
    let mut refreshed = false;

    if token.needs_refresh(Utc::now()) {
        tracing::info!(
            user_id = account.user_id(),
            op,
            "YouTube access token expired or expiring, refreshing before call"
        );
        token = account.refresh(&token.access_token).await?;
        refreshed = true;
    }

    let result = call(token.access_token.clone()).await;

    let result = match result {
        Err(AppError::YouTubeUnauthorized) if !refreshed => {
            tracing::info!(
                user_id = account.user_id(),
                op,
                "YouTube rejected access token, refreshing and retrying once"
            );
            let fresh = account.refresh(&token.access_token).await?;
            call(fresh.access_token).await
        }
        other => other,
    };

    match result {
        Err(AppError::YouTubeUnauthorized) => {
            tracing::warn!(
                user_id = account.user_id(),
                op,
                "YouTube rejected refreshed access token"
            );
            Err(AppError::YouTubeAuthRequired(
                "YouTube authorization expired. Please reconnect your YouTube account."
                    .to_string(),
            ))
        }
        other => other,
    }
}
