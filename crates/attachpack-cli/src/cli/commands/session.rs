//! Shared setup for commands that talk to Gmail.

use anyhow::{Context, Result};
use attachpack_core::auth::{self, ClientSecrets};
use attachpack_core::collect::CollectOptions;
use attachpack_core::config::AttachpackConfig;
use attachpack_core::gmail::GmailClient;
use attachpack_core::retry::RetryPolicy;

pub fn retry_policy(cfg: &AttachpackConfig) -> RetryPolicy {
    RetryPolicy::from_config(&cfg.retry_config())
}

/// Load client secrets and a fresh access token, and build the API client.
pub async fn connect(cfg: &AttachpackConfig) -> Result<(GmailClient, RetryPolicy)> {
    let policy = retry_policy(cfg);
    let credentials = cfg.credentials_path()?;
    let secrets = ClientSecrets::load(&credentials).with_context(|| {
        format!(
            "load client secrets from {} (run `attachpack auth --credentials <file>` first)",
            credentials.display()
        )
    })?;
    let token = auth::ensure_fresh(&secrets, &cfg.token_path()?, &policy).await?;
    Ok((GmailClient::from_config(&cfg.gmail, token.access_token), policy))
}

pub fn collect_options(
    cfg: &AttachpackConfig,
    max: Option<usize>,
    extensions: &[String],
) -> CollectOptions {
    CollectOptions {
        max_messages: max,
        extensions: extensions.to_vec(),
        page_size: cfg.gmail.page_size,
    }
}
