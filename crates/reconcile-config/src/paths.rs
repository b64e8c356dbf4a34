use anyhow::Result;
use std::path::PathBuf;

/// Base directory override from `TRAKT_RECONCILE_HOME`, if set
fn home_override() -> Option<PathBuf> {
    std::env::var("TRAKT_RECONCILE_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("trakt-reconcile");

        Ok(Self::from_base(base_dir))
    }

    pub fn from_base(base: PathBuf) -> Self {
        Self { config_dir: base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Some(base) = home_override() {
            return Self::from_base(base);
        }

        // Platform-specific paths (e.g., ~/.config/trakt-reconcile on Linux)
        Self::new().unwrap_or_else(|_| Self::from_base(PathBuf::from(".trakt-reconcile")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_from_base() {
        let paths = PathManager::from_base(PathBuf::from("/srv/reconcile"));
        assert_eq!(paths.config_file(), PathBuf::from("/srv/reconcile/config.toml"));
        assert_eq!(paths.credentials_file(), PathBuf::from("/srv/reconcile/credentials.toml"));
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::from_base(dir.path().join("nested"));
        paths.ensure_directories().unwrap();
        assert!(dir.path().join("nested").is_dir());
    }
}
