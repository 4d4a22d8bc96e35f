//! Configuration management for feedloop.
//!
//! The configuration lives in a JSON dotfile in the user's home
//! directory and records the database connection string and the
//! currently logged-in user.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FeedloopError, Result};

/// Name of the config file in the home directory.
const CONFIG_FILE_NAME: &str = ".feedloopconfig.json";

/// Environment variable overriding the config file location.
const CONFIG_PATH_ENV: &str = "FEEDLOOP_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection string (e.g. `sqlite://feedloop.db`).
    pub db_url: String,
    /// Name of the currently logged-in user, if any.
    #[serde(default)]
    pub current_user_name: Option<String>,
    /// Path the config was loaded from. Not serialized.
    #[serde(skip)]
    path: PathBuf,
}

impl Config {
    /// Resolve the config file path.
    ///
    /// `FEEDLOOP_CONFIG` takes precedence; otherwise the file lives in
    /// the home directory.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = std::env::var_os("HOME")
            .ok_or_else(|| FeedloopError::Config("HOME is not set".to_string()))?;
        Ok(PathBuf::from(home).join(CONFIG_FILE_NAME))
    }

    /// Load the configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Load the configuration from a specific path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FeedloopError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config: Config = serde_json::from_str(&contents)
            .map_err(|e| FeedloopError::Config(format!("invalid config: {}", e)))?;
        config.path = path.to_path_buf();
        Ok(config)
    }

    /// Write the configuration back to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| FeedloopError::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(&self.path, contents).map_err(|e| {
            FeedloopError::Config(format!("failed to write {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }

    /// Record `username` as the current user and persist the change.
    pub fn set_user(&mut self, username: &str) -> Result<()> {
        self.current_user_name = Some(username.to_string());
        self.save()
    }

    /// Name of the currently logged-in user.
    pub fn current_user(&self) -> Result<&str> {
        self.current_user_name
            .as_deref()
            .ok_or_else(|| FeedloopError::Config("no user is logged in".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{"db_url": "sqlite://test.db", "current_user_name": "alice"}"#,
        );

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.db_url, "sqlite://test.db");
        assert_eq!(config.current_user_name, Some("alice".to_string()));
        assert_eq!(config.current_user().unwrap(), "alice");
    }

    #[test]
    fn test_load_config_without_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{"db_url": "sqlite://test.db"}"#);

        let config = Config::load_from(&path).unwrap();
        assert!(config.current_user_name.is_none());
        assert!(config.current_user().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from(dir.path().join("nope.json"));
        assert!(matches!(result, Err(FeedloopError::Config(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not json");
        let result = Config::load_from(&path);
        assert!(matches!(result, Err(FeedloopError::Config(_))));
    }

    #[test]
    fn test_set_user_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{"db_url": "sqlite://test.db"}"#);

        let mut config = Config::load_from(&path).unwrap();
        config.set_user("bob").unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.current_user_name, Some("bob".to_string()));
        assert_eq!(reloaded.db_url, "sqlite://test.db");
    }
}
