use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// On-disk layout of `credentials.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct TraktTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trakt_access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trakt_refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trakt_token_expires: Option<DateTime<Utc>>,
}

/// Trakt OAuth tokens, kept apart from `config.toml`
pub struct CredentialStore {
    path: PathBuf,
    tokens: TraktTokens,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            tokens: TraktTokens::default(),
        }
    }

    /// A missing file leaves the store empty
    pub fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        self.tokens = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.tokens)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    pub fn get_trakt_access_token(&self) -> Option<&String> {
        self.tokens.trakt_access_token.as_ref()
    }

    pub fn set_trakt_access_token(&mut self, token: String) {
        self.tokens.trakt_access_token = Some(token);
    }

    pub fn get_trakt_refresh_token(&self) -> Option<&String> {
        self.tokens.trakt_refresh_token.as_ref()
    }

    pub fn set_trakt_refresh_token(&mut self, token: String) {
        self.tokens.trakt_refresh_token = Some(token);
    }

    pub fn get_trakt_token_expires(&self) -> Option<DateTime<Utc>> {
        self.tokens.trakt_token_expires
    }

    pub fn set_trakt_token_expires(&mut self, expires: DateTime<Utc>) {
        self.tokens.trakt_token_expires = Some(expires);
    }

    /// True when a stored expiry exists and falls within `margin` of now
    pub fn trakt_token_expiring(&self, margin: Duration) -> bool {
        self.get_trakt_token_expires()
            .map(|expires_at| expires_at <= Utc::now() + margin)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        let expires = Utc::now() + Duration::hours(1);

        let mut store = CredentialStore::new(path.clone());
        store.set_trakt_access_token("access".to_string());
        store.set_trakt_refresh_token("refresh".to_string());
        store.set_trakt_token_expires(expires);
        store.save().unwrap();

        let mut loaded = CredentialStore::new(path);
        loaded.load().unwrap();
        assert_eq!(loaded.get_trakt_access_token().map(String::as_str), Some("access"));
        assert_eq!(loaded.get_trakt_refresh_token().map(String::as_str), Some("refresh"));
        let loaded_expires = loaded.get_trakt_token_expires().unwrap();
        assert!((loaded_expires - expires).num_seconds().abs() < 2);
    }

    #[test]
    fn test_expiry_margin() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        assert!(!store.trakt_token_expiring(Duration::hours(24)));

        store.set_trakt_token_expires(Utc::now() + Duration::hours(1));
        assert!(!store.trakt_token_expiring(Duration::minutes(5)));
        assert!(store.trakt_token_expiring(Duration::hours(2)));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.load().unwrap();
        assert_eq!(store.get_trakt_access_token(), None);
        assert_eq!(store.get_trakt_refresh_token(), None);
    }

    #[test]
    fn test_unset_tokens_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        let mut store = CredentialStore::new(path.clone());
        store.set_trakt_access_token("access".to_string());
        store.save().unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("trakt_access_token"));
        assert!(!content.contains("trakt_refresh_token"));
    }
}
