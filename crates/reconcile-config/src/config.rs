use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TRAKT_API_URL: &str = "https://api.trakt.tv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingValues(Vec<String>),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trakt: TraktConfig,
    #[serde(default = "default_radarr")]
    pub radarr: ServiceConfig,
    #[serde(default = "default_sonarr")]
    pub sonarr: ServiceConfig,
    #[serde(default)]
    pub sync: SyncOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktConfig {
    #[serde(default)]
    pub client_id: String,
    /// Only needed for `auth` and token refresh
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_trakt_api_url")]
    pub api_url: String,
    /// Resolved at startup from `TRAKT_ACCESS_TOKEN` or the credential store.
    /// Never written to `config.toml`.
    #[serde(skip)]
    pub access_token: Option<String>,
}

/// Connection details for a Radarr/Sonarr instance. `url` includes the API
/// prefix, e.g. `http://localhost:7878/api/v3`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOptions {
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_episode_concurrency")]
    pub episode_concurrency: usize,
    /// Per-request HTTP timeout. Unset means requests may block indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_trakt_api_url() -> String {
    DEFAULT_TRAKT_API_URL.to_string()
}

fn default_radarr() -> ServiceConfig {
    ServiceConfig {
        url: "http://localhost:7878/api/v3".to_string(),
        api_key: String::new(),
    }
}

fn default_sonarr() -> ServiceConfig {
    ServiceConfig {
        url: "http://localhost:8989/api/v3".to_string(),
        api_key: String::new(),
    }
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_episode_concurrency() -> usize {
    10
}

impl Default for TraktConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            username: String::new(),
            api_url: default_trakt_api_url(),
            access_token: None,
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            episode_concurrency: default_episode_concurrency(),
            request_timeout_secs: None,
        }
    }
}

impl SyncOptions {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Template written by `config init`
    pub fn template() -> Self {
        Self {
            trakt: TraktConfig::default(),
            radarr: default_radarr(),
            sonarr: default_sonarr(),
            sync: SyncOptions::default(),
        }
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise start from the template so that a
    /// purely environment-driven setup still works
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::template())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TRAKT_CLIENT_ID") {
            self.trakt.client_id = v;
        }
        if let Some(v) = get("TRAKT_CLIENT_SECRET") {
            self.trakt.client_secret = v;
        }
        if let Some(v) = get("TRAKT_USERNAME") {
            self.trakt.username = v;
        }
        if let Some(v) = get("TRAKT_ACCESS_TOKEN") {
            self.trakt.access_token = Some(v);
        }
        if let Some(v) = get("TRAKT_API_URL") {
            self.trakt.api_url = v;
        }
        if let Some(v) = get("RADARR_URL") {
            self.radarr.url = v;
        }
        if let Some(v) = get("RADARR_API_KEY") {
            self.radarr.api_key = v;
        }
        if let Some(v) = get("SONARR_URL") {
            self.sonarr.url = v;
        }
        if let Some(v) = get("SONARR_API_KEY") {
            self.sonarr.api_key = v;
        }
    }

    /// Check that everything a reconciliation run needs is present.
    /// All missing keys are reported at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();

        let required = [
            (&self.trakt.client_id, "trakt.client_id (TRAKT_CLIENT_ID)"),
            (&self.trakt.username, "trakt.username (TRAKT_USERNAME)"),
            (&self.trakt.api_url, "trakt.api_url (TRAKT_API_URL)"),
            (&self.radarr.url, "radarr.url (RADARR_URL)"),
            (&self.radarr.api_key, "radarr.api_key (RADARR_API_KEY)"),
            (&self.sonarr.url, "sonarr.url (SONARR_URL)"),
            (&self.sonarr.api_key, "sonarr.api_key (SONARR_API_KEY)"),
        ];
        for (value, name) in required {
            if value.trim().is_empty() {
                missing.push(name.to_string());
            }
        }

        if self
            .trakt
            .access_token
            .as_deref()
            .map(|t| t.trim().is_empty())
            .unwrap_or(true)
        {
            missing.push("Trakt access token (TRAKT_ACCESS_TOKEN or `trakt-reconcile auth`)".to_string());
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingValues(missing));
        }

        if self.sync.retry_attempts == 0 {
            return Err(ConfigError::Invalid("sync.retry_attempts must be at least 1".to_string()));
        }
        if self.sync.episode_concurrency == 0 {
            return Err(ConfigError::Invalid("sync.episode_concurrency must be at least 1".to_string()));
        }

        Ok(())
    }
}
