use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per API call (including the first).
    pub max_attempts: u32,
    /// Delay after the first failed attempt in milliseconds; doubles per attempt.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

/// Gmail REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GmailConfig {
    /// Base URL of the Gmail API (overridable for testing against a local server).
    pub api_base: String,
    /// Mailbox to search; `me` is the authenticated user.
    pub user_id: String,
    /// `maxResults` per search page (Gmail caps this at 500).
    pub page_size: u32,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_id: "me".to_string(),
            page_size: 100,
        }
    }
}

/// OAuth client settings. Paths default to files next to config.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Client secrets JSON downloaded from the Google Cloud console.
    pub credentials_path: Option<PathBuf>,
    /// Where the access/refresh token is stored.
    pub token_path: Option<PathBuf>,
    pub scope: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            token_path: None,
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/attachpack/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachpackConfig {
    /// Directory for archives when `--output` is not given (None = current dir).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub gmail: GmailConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
}

impl AttachpackConfig {
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn credentials_path(&self) -> Result<PathBuf> {
        match &self.oauth.credentials_path {
            Some(p) => Ok(p.clone()),
            None => config_file("credentials.json"),
        }
    }

    pub fn token_path(&self) -> Result<PathBuf> {
        match &self.oauth.token_path {
            Some(p) => Ok(p.clone()),
            None => config_file("token.json"),
        }
    }
}

fn config_file(name: &str) -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("attachpack")?;
    Ok(xdg_dirs.place_config_file(name)?)
}

pub fn config_path() -> Result<PathBuf> {
    config_file("config.toml")
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AttachpackConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AttachpackConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AttachpackConfig = toml::from_str(&data)?;
    Ok(cfg)
}
