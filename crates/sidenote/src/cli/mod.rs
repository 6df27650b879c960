//! Command-line interface for sidenote.
//!
//! This module provides the CLI structure and argument types for the
//! `sidenote` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ServeArgs, StatusArgs};

/// sidenote - capture annotations, clippings, and files from your browser
///
/// A single-endpoint server that records JSON submissions in an append-only
/// log and serves them back as an HTML feed grouped by source page.
#[derive(Debug, Parser)]
#[command(name = "sidenote")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the capture server
    Serve(ServeArgs),

    /// Show record log and upload store statistics
    Status(StatusArgs),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "sidenote");
    }

    #[test]
    fn test_cli_verify() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_quiet() {
        let cli = Cli::try_parse_from(["sidenote", "-q", "status"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        let cli = Cli::try_parse_from(["sidenote", "status"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        let cli = Cli::try_parse_from(["sidenote", "-v", "status"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_trace() {
        let cli = Cli::try_parse_from(["sidenote", "-vv", "status"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Trace);
    }

    #[test]
    fn test_parse_serve_with_paths() {
        let cli = Cli::try_parse_from([
            "sidenote",
            "serve",
            "/data/records.ndjson",
            "/data/uploads",
        ])
        .unwrap();

        let Command::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(
            args.log_file,
            Some(PathBuf::from("/data/records.ndjson"))
        );
        assert_eq!(args.upload_dir, Some(PathBuf::from("/data/uploads")));
    }

    #[test]
    fn test_parse_serve_with_flags() {
        let cli = Cli::try_parse_from([
            "sidenote", "serve", "--host", "0.0.0.0", "-p", "9000", "-k", "sekrit",
        ])
        .unwrap();

        let Command::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.key.as_deref(), Some("sekrit"));
    }

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from(["sidenote", "status", "--json"]).unwrap();
        let Command::Status(args) = cli.command else {
            panic!("expected status command");
        };
        assert!(args.json);
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["sidenote", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: false })
        ));
    }

    #[test]
    fn test_parse_config_path() {
        let cli = Cli::try_parse_from(["sidenote", "config", "path"]).unwrap();
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Path)));
    }

    #[test]
    fn test_parse_with_config_file() {
        let cli =
            Cli::try_parse_from(["sidenote", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }
}
