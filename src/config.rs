//! Configuration for the console host.
//!
//! Handles loading the host configuration from a TOML file, with defaults
//! for every field so a missing file is not an error.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Console host settings.
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Console host settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Prefix a line must start with to be treated as a command.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Display name of the console caller.
    #[serde(default = "default_user")]
    pub user: String,

    /// Print a hint when a line names a command nothing subscribed to.
    #[serde(default = "default_unknown_hint")]
    pub unknown_hint: bool,
}

fn default_prefix() -> String {
    "/".to_string()
}

fn default_user() -> String {
    "console".to_string()
}

fn default_unknown_hint() -> bool {
    true
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            user: default_user(),
            unknown_hint: default_unknown_hint(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("crier")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
