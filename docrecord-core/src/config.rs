//! Configuration file for docrecord tools
//!
//! Lives at `~/.docrecord/config.toml`:
//!
//! ```toml
//! connection_string = "mongodb://localhost:27017/app"
//!
//! [options]
//! connect_timeout_ms = 5000
//! replica_set = "rs0"
//! ```
//!
//! Without an `[options]` table, options are derived from the connection
//! string. With one, the table is used as-is and missing keys take the usual
//! defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::{ConnectionOptions, ReplicaSetOptions};

/// Errors reading or parsing the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?} (invalid TOML): {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocrecordConfig {
    /// Default connection string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    /// Explicit driver options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionsConfig>,
}

/// `[options]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsConfig {
    pub auto_reconnect: Option<bool>,
    pub connect_timeout_ms: Option<u64>,
    pub keep_alive_ms: Option<u64>,
    pub replica_set: Option<String>,
}

impl OptionsConfig {
    /// Resolve into driver options, filling gaps with defaults.
    pub fn to_options(&self) -> ConnectionOptions {
        let defaults = ConnectionOptions::default();
        let connect_timeout = self
            .connect_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.connect_timeout);
        let keep_alive = self
            .keep_alive_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.keep_alive);

        ConnectionOptions {
            auto_reconnect: self.auto_reconnect.unwrap_or(defaults.auto_reconnect),
            connect_timeout,
            keep_alive,
            replica_set: self.replica_set.as_ref().map(|name| ReplicaSetOptions {
                name: name.clone(),
                connect_timeout,
                keep_alive,
            }),
        }
    }
}

impl DocrecordConfig {
    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config directory: ~/.docrecord
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".docrecord")
    }

    /// Config file path: ~/.docrecord/config.toml
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Explicit options, if an `[options]` table was given.
    pub fn connection_options(&self) -> Option<ConnectionOptions> {
        self.options.as_ref().map(OptionsConfig::to_options)
    }
}
