//! Configuration file parser for ~/.config/gather/config.toml.
//!
//! The config file is optional — a missing or empty file yields
//! `Config::default()`. Unknown keys are ignored by serde, though we log a
//! warning when the file contains potential typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::storage::{DatabaseError, Driver};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified; missing keys fall back to `Default::default()`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage driver tag. Parsed through [`Driver`]; an unknown tag fails
    /// at startup, not at first use.
    pub driver: String,

    /// Database file location. Defaults to `<config dir>/gather.db`.
    pub database: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            database: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["driver", "database"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), driver = %config.driver, "Loaded configuration");
        Ok(config)
    }

    /// Parse the configured driver tag into the closed driver set.
    pub fn driver(&self) -> Result<Driver, DatabaseError> {
        self.driver.parse()
    }

    /// Resolve the database path, falling back to `<config_dir>/gather.db`.
    pub fn database_path(&self, config_dir: &Path) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| config_dir.join("gather.db"))
    }
}
