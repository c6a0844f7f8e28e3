//! Configuration handling for the expense ledger
//!
//! Configuration is read from `config.toml` in the platform config
//! directory (e.g. `~/.config/expense-ledger/config.toml` on Linux).
//! Every field is optional; command-line flags override it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::location::{StoreLocation, DEFAULT_DIRECTORY};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding ledger files
    pub directory: PathBuf,

    /// Ledger file name (defaults to `expense.txt`)
    pub file_name: Option<String>,

    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            file_name: None,
            default_format: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Returns the config directory
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "expense", "expense-ledger")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the path of the config file, if a config directory exists
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Loads configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file, falling back to defaults
    /// when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Builds the ledger location, letting explicit values win
    pub fn location(&self, directory: Option<PathBuf>, file_name: Option<String>) -> StoreLocation {
        StoreLocation::new(
            directory.unwrap_or_else(|| self.directory.clone()),
            file_name.or_else(|| self.file_name.clone()),
        )
    }
}
