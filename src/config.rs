//! Runtime configuration loaded from a TOML file

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Data directory not found")]
    DataDirNotFound,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StudyConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// How long a transaction waits on a locked database before giving up
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default)]
    pub import: ImportConfig,
}

/// Settings for bulk verse import
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ImportConfig {
    /// Version label attached to imported translations
    #[serde(default = "default_version_label")]
    pub version_label: String,
    /// Language code attached to imported translations
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_database_path() -> PathBuf {
    StudyConfig::default_data_dir()
        .map(|dir| dir.join("quran_study_hub.sqlite"))
        .unwrap_or_else(|_| PathBuf::from("quran_study_hub.sqlite"))
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_version_label() -> String {
    "Imported Urdu".to_string()
}

fn default_language() -> String {
    "ur".to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            version_label: default_version_label(),
            language: default_language(),
        }
    }
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            import: ImportConfig::default(),
        }
    }
}

impl StudyConfig {
    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
        dirs::data_local_dir()
            .map(|p| p.join("quran-study"))
            .ok_or(ConfigError::DataDirNotFound)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: StudyConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` if given and present, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            Some(p) => {
                log::info!("Config file {:?} not found, using defaults", p);
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
