//! Persisted OAuth token.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds after which `access_token` is no longer valid.
    pub expires_at: u64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

/// Token endpoint response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}

impl StoredToken {
    /// Build from a token response received at `now`. Google omits the
    /// refresh token on refresh, so `previous_refresh` is kept in that case.
    pub(crate) fn from_response(
        resp: TokenResponse,
        now: u64,
        previous_refresh: Option<String>,
    ) -> Self {
        Self {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token.or(previous_refresh),
            expires_at: now.saturating_add(resp.expires_in),
            scope: resp.scope,
            token_type: resp.token_type.unwrap_or_else(default_token_type),
        }
    }

    /// True if the token is expired at `now` or will be within `skew_secs`.
    pub fn expires_within(&self, now: u64, skew_secs: u64) -> bool {
        now.saturating_add(skew_secs) >= self.expires_at
    }

    /// Load the token file; `Ok(None)` if it does not exist yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let token = serde_json::from_str(&data)
            .with_context(|| format!("parse token file {}", path.display()))?;
        Ok(Some(token))
    }

    /// Write the token file, owner-only on Unix.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let mut opts = fs::OpenOptions::new();
        opts.create(true).write(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        let mut file = opts
            .open(path)
            .with_context(|| format!("open {} for writing", path.display()))?;
        file.write_all(json.as_bytes())?;
        tracing::debug!("saved token to {}", path.display());
        Ok(())
    }
}
