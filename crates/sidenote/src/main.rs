//! `sidenote` - CLI for the sidenote capture server
//!
//! This binary runs the capture server and provides small operational
//! commands for inspecting the record log and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use clap::Parser;

use sidenote::cli::{Cli, Command, ConfigCommand, ServeArgs, StatusArgs};
use sidenote::store::{LogStats, RecordLog, UploadStats, UploadStore};
use sidenote::{init_logging, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match cli.command {
        Command::Serve(args) => run_serve(cli.config, args).await,
        Command::Status(args) => run_status(cli.config, &args),
        Command::Config(config_cmd) => run_config(cli.config, config_cmd),
    }
}

async fn run_serve(config_path: Option<PathBuf>, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = Config::load_from(config_path)?;
    args.apply(&mut config);
    // Flags can introduce values the file never had; check the result again.
    config.validate()?;

    sidenote::server::serve(config).await?;
    Ok(())
}

fn run_status(config_path: Option<PathBuf>, args: &StatusArgs) -> anyhow::Result<()> {
    let config = Config::load_from(config_path)?;
    let log_path = config.log_file()?.to_path_buf();
    let upload_dir = config.upload_dir()?.to_path_buf();

    // Don't create anything from a read-only command.
    let log_stats = if log_path.exists() {
        RecordLog::open(&log_path)?.stats()?
    } else {
        LogStats {
            total_records: 0,
            groups: 0,
            oldest_time: None,
            newest_time: None,
            log_size_bytes: 0,
        }
    };
    let upload_stats = if upload_dir.exists() {
        UploadStore::open(&upload_dir)?.stats()?
    } else {
        UploadStats {
            files: 0,
            total_bytes: 0,
        }
    };

    if args.json {
        let status = serde_json::json!({
            "log_file": log_path,
            "records": log_stats.total_records,
            "groups": log_stats.groups,
            "oldest": log_stats.oldest_time,
            "newest": log_stats.newest_time,
            "log_size_bytes": log_stats.log_size_bytes,
            "upload_dir": upload_dir,
            "uploads": {
                "files": upload_stats.files,
                "bytes": upload_stats.total_bytes,
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("sidenote status");
        println!("---------------");
        println!("Log:       {}", log_path.display());
        println!(
            "Records:   {} in {} groups",
            log_stats.total_records, log_stats.groups
        );
        if let Some(oldest) = log_stats.oldest_time {
            println!("Oldest:    {}", format_time(oldest));
        }
        if let Some(newest) = log_stats.newest_time {
            println!("Newest:    {}", format_time(newest));
        }
        println!("Log size:  {} bytes", log_stats.log_size_bytes);
        println!(
            "Uploads:   {} files, {} bytes in {}",
            upload_stats.files,
            upload_stats.total_bytes,
            upload_dir.display()
        );
    }
    Ok(())
}

fn run_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[server]");
                println!("  host: {}", config.server.host);
                println!("  port: {}", config.server.port);
                println!(
                    "  key:  {}",
                    if config.requires_key() {
                        "(set)"
                    } else {
                        "(not set)"
                    }
                );
                println!();
                println!("[storage]");
                println!("  log:     {}", display_path(config.storage.log.as_deref()));
                println!(
                    "  uploads: {}",
                    display_path(config.storage.uploads.as_deref())
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

/// Render a record timestamp for humans; falls back to the raw number for
/// values outside the representable range.
#[allow(clippy::cast_possible_truncation)]
fn format_time(time: f64) -> String {
    chrono::DateTime::from_timestamp(time as i64, 0)
        .map_or_else(|| time.to_string(), |datetime| datetime.to_rfc3339())
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(|| "(not set)".to_string(), |p| p.display().to_string())
}
