//! OAuth client credentials as downloaded from the Google Cloud console.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const FALLBACK_REDIRECT_URI: &str = "http://localhost";

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// The console wraps credentials in `installed` (desktop apps) or `web`.
#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn from_json(data: &str) -> Result<Self> {
        let file: SecretsFile = serde_json::from_str(data).context("parse client secrets JSON")?;
        file.installed
            .or(file.web)
            .ok_or_else(|| anyhow!("client secrets JSON has neither an `installed` nor a `web` section"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).with_context(|| {
            format!(
                "read client secrets {} (download an OAuth desktop client JSON from the Google Cloud console)",
                path.display()
            )
        })?;
        Self::from_json(&data).with_context(|| format!("load {}", path.display()))
    }

    /// First registered redirect URI, or `http://localhost`.
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(FALLBACK_REDIRECT_URI)
    }
}
