//! Application configuration
//!
//! Read from `<config dir>/flashdeck/config.toml`. Every key is optional:
//!
//! ```toml
//! database_path = "/home/me/.local/share/flashdeck/flashcards.db"
//! log_file = "/home/me/.local/share/flashdeck/app.log"
//! log_level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR: &str = "flashdeck";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "flashcards.db";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not determine a data directory")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding decks and cards
    pub database_path: PathBuf,
    /// Append log records here instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// `env_logger` filter, e.g. "info" or "flashdeck=debug"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path()
                .unwrap_or_else(|_| PathBuf::from("data").join(DATABASE_FILE)),
            log_file: None,
            log_level: None,
        }
    }
}

impl AppConfig {
    /// Load the config from its default location.
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load the config at `path`; a missing file means all defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Per-user data directory for flashdeck
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|p| p.join(APP_DIR))
        .ok_or(ConfigError::DataDirNotFound)
}

pub fn default_database_path() -> Result<PathBuf> {
    Ok(default_data_dir()?.join(DATABASE_FILE))
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let config = AppConfig::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.database_path.ends_with(DATABASE_FILE));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "database_path = \"/tmp/decks.db\"\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/decks.db"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_partial_config_keeps_default_database() {
        let config = AppConfig::parse("log_file = \"app.log\"").unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("app.log")));
        assert_eq!(config.database_path, AppConfig::default().database_path);
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::parse("database_path = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
