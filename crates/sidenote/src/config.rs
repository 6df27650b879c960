//! Configuration management for sidenote.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults. The
//! resulting [`Config`] is built once at startup and passed explicitly into
//! the server — it is never ambient global state.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "sidenote";

/// Default bind address: local-only.
const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port.
const DEFAULT_PORT: u16 = 8888;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. `serve` command-line arguments
/// 2. Environment variables (prefixed with `SIDENOTE_`)
/// 3. TOML config file at `~/.config/sidenote/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Server-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server binds to.
    pub host: String,
    /// Port the server listens on.
    pub port: u16,
    /// Shared secret clients must present in the `Authentication` header on
    /// writes. When unset, writes are unauthenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Storage-related configuration.
///
/// Both paths are required to run the server; they have no defaults because
/// the record log is the single source of truth and should live wherever
/// the operator decides to keep it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the newline-delimited JSON record log.
    pub log: Option<PathBuf>,
    /// Directory holding content-addressed uploads.
    pub uploads: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            key: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if it exists)
    /// 3. Environment variables (prefixed with `SIDENOTE_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails, or if
    /// the merged configuration is invalid.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SIDENOTE_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(Error::config_validation("server.host must not be empty"));
        }

        // An empty key would let any request with an empty header through.
        if self.server.key.as_deref() == Some("") {
            return Err(Error::config_validation(
                "server.key must not be empty; omit it to disable authentication",
            ));
        }

        Ok(())
    }

    /// The record log path; required to serve.
    ///
    /// # Errors
    ///
    /// Returns a validation error when no log path is configured.
    pub fn log_file(&self) -> Result<&Path> {
        self.storage.log.as_deref().ok_or_else(|| {
            Error::config_validation(
                "storage.log is required: set it in the config file or pass LOG_FILE to serve",
            )
        })
    }

    /// The upload directory; required to serve.
    ///
    /// # Errors
    ///
    /// Returns a validation error when no upload directory is configured.
    pub fn upload_dir(&self) -> Result<&Path> {
        self.storage.uploads.as_deref().ok_or_else(|| {
            Error::config_validation(
                "storage.uploads is required: set it in the config file or pass UPLOAD_DIR to serve",
            )
        })
    }

    /// Whether writes require the shared key.
    #[must_use]
    pub fn requires_key(&self) -> bool {
        self.server.key.is_some()
    }
}
