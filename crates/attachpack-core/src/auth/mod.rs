//! OAuth for the Gmail API: client secrets, token file, consent flow and a
//! single refresh-if-expired check before each run.

mod flow;
mod secrets;
mod token;

pub use flow::{authorize_url, exchange_code, extract_code, refresh};
pub use secrets::{ClientSecrets, DEFAULT_AUTH_URI, DEFAULT_TOKEN_URI};
pub use token::{unix_now, StoredToken};

use anyhow::{bail, Result};
use std::path::Path;

use crate::retry::RetryPolicy;

/// Refresh when the token has less than this many seconds left.
pub const EXPIRY_SKEW_SECS: u64 = 60;

/// Load the saved token and refresh it once if it is (nearly) expired.
pub async fn ensure_fresh(
    secrets: &ClientSecrets,
    token_path: &Path,
    policy: &RetryPolicy,
) -> Result<StoredToken> {
    let Some(token) = StoredToken::load(token_path)? else {
        bail!(
            "no saved token at {}; run `attachpack auth` first",
            token_path.display()
        );
    };
    if !token.expires_within(unix_now(), EXPIRY_SKEW_SECS) {
        return Ok(token);
    }
    if token.refresh_token.is_none() {
        bail!("access token expired and no refresh token is stored; run `attachpack auth` again");
    }
    tracing::info!("access token expired, refreshing");
    let fresh = refresh(secrets, policy, &token).await?;
    fresh.save(token_path)?;
    Ok(fresh)
}
