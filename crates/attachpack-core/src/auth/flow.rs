//! Installed-app consent flow: consent URL, code exchange, refresh.

use anyhow::{anyhow, Context, Result};
use url::Url;

use super::secrets::ClientSecrets;
use super::token::{unix_now, StoredToken, TokenResponse};
use crate::http;
use crate::retry::{run_with_retry, RetryPolicy};

/// Consent page URL the user opens in a browser.
pub fn authorize_url(secrets: &ClientSecrets, scope: &str) -> Result<String> {
    let url = Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", secrets.redirect_uri()),
            ("response_type", "code"),
            ("scope", scope),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .with_context(|| format!("invalid auth_uri {:?}", secrets.auth_uri))?;
    Ok(url.into())
}

/// Authorization code from user input: either the bare code or the whole
/// URL the browser was redirected to (`...?code=...&scope=...`).
pub fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match Url::parse(input) {
        Ok(url) => url
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .filter(|code| !code.is_empty()),
        Err(_) => Some(input.to_string()),
    }
}

fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Trade an authorization code for tokens.
pub async fn exchange_code(
    secrets: &ClientSecrets,
    policy: &RetryPolicy,
    code: &str,
) -> Result<StoredToken> {
    let body = form(&[
        ("code", code),
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
        ("redirect_uri", secrets.redirect_uri()),
        ("grant_type", "authorization_code"),
    ]);
    let resp: TokenResponse = run_with_retry(policy, "Exchanging authorization code", || {
        http::post_form_json(secrets.token_uri.clone(), body.clone())
    })
    .await?;
    if resp.refresh_token.is_none() {
        tracing::warn!("token endpoint returned no refresh token; re-run auth when the access token expires");
    }
    Ok(StoredToken::from_response(resp, unix_now(), None))
}

/// Get a new access token with the stored refresh token.
pub async fn refresh(
    secrets: &ClientSecrets,
    policy: &RetryPolicy,
    token: &StoredToken,
) -> Result<StoredToken> {
    let refresh_token = token
        .refresh_token
        .clone()
        .ok_or_else(|| anyhow!("no refresh token stored"))?;
    let body = form(&[
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
        ("refresh_token", refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ]);
    let resp: TokenResponse = run_with_retry(policy, "Refreshing access token", || {
        http::post_form_json(secrets.token_uri.clone(), body.clone())
    })
    .await?;
    Ok(StoredToken::from_response(resp, unix_now(), Some(refresh_token)))
}
