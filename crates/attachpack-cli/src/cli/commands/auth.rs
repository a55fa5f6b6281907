//! `attachpack auth` – installed-app consent flow; saves the token for later runs.

use anyhow::{anyhow, Context, Result};
use attachpack_core::auth::{self, ClientSecrets};
use attachpack_core::config::AttachpackConfig;
use std::io::{self, BufRead, Write};
use std::path::Path;

use super::session::retry_policy;

pub async fn run_auth(cfg: &AttachpackConfig, credentials: Option<&Path>) -> Result<()> {
    let default_path = cfg.credentials_path()?;
    let source = credentials.unwrap_or(&default_path);
    let secrets = ClientSecrets::load(source)?;

    // Later runs read the secrets from the config dir.
    if source != default_path.as_path() {
        std::fs::copy(source, &default_path).with_context(|| {
            format!(
                "copy {} to {}",
                source.display(),
                default_path.display()
            )
        })?;
        println!("Copied client secrets to {}", default_path.display());
    }

    let url = auth::authorize_url(&secrets, &cfg.oauth.scope)?;
    println!("Open this URL in a browser and grant access:\n\n  {url}\n");
    print!("Paste the authorization code (or the URL you were redirected to): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read authorization code")?;
    let code = auth::extract_code(&line).ok_or_else(|| anyhow!("no authorization code entered"))?;

    let token = auth::exchange_code(&secrets, &retry_policy(cfg), &code).await?;
    let token_path = cfg.token_path()?;
    token.save(&token_path)?;
    tracing::info!(path = %token_path.display(), "saved oauth token");
    println!("Saved token to {}", token_path.display());
    Ok(())
}
