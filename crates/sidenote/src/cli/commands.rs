//! CLI command definitions.
//!
//! This module defines the argument structures of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::Config;

/// Serve command arguments.
///
/// Positional paths and flags override the configuration file; anything
/// left unset falls back to the loaded configuration.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Path to the record log (newline-delimited JSON)
    pub log_file: Option<PathBuf>,

    /// Directory for uploaded files
    pub upload_dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Secret key clients must present in the Authentication header
    #[arg(short, long)]
    pub key: Option<String>,
}

impl ServeArgs {
    /// Fold the command-line overrides into the loaded configuration.
    pub fn apply(self, config: &mut Config) {
        if let Some(log_file) = self.log_file {
            config.storage.log = Some(log_file);
        }
        if let Some(upload_dir) = self.upload_dir {
            config.storage.uploads = Some(upload_dir);
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(key) = self.key {
            config.server.key = Some(key);
        }
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
