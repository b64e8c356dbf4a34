pub mod auth;
pub mod config;
pub mod prompts;
pub mod sync;
pub mod sync_ui;

use reconcile_config::{Config, CredentialStore, PathManager};
use std::path::PathBuf;

/// File locations for this invocation. `--config` only moves the config file;
/// credentials stay in the base directory.
pub struct AppPaths {
    pub manager: PathManager,
    pub config_file: PathBuf,
}

impl AppPaths {
    pub fn resolve(config_override: Option<PathBuf>) -> Self {
        let manager = PathManager::default();
        let config_file = config_override.unwrap_or_else(|| manager.config_file());
        Self { manager, config_file }
    }

    /// Config file (or template) with environment overrides applied
    pub fn load_config(&self) -> color_eyre::Result<Config> {
        let mut config = Config::load_or_default(&self.config_file).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to load config from {}: {}", self.config_file.display(), e)
        })?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_credentials(&self) -> color_eyre::Result<CredentialStore> {
        let credentials_file = self.manager.credentials_file();
        let mut store = CredentialStore::new(credentials_file.clone());
        store.load().map_err(|e| {
            color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e)
        })?;
        Ok(store)
    }
}
