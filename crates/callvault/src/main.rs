// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Callvault - archive and restore call history.
//!
//! This is the binary entry point.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use callvault_config::model::CallvaultConfig;
use callvault_core::CallvaultError;
use clap::{Parser, Subcommand};

/// Callvault - archive and restore call history.
#[derive(Parser, Debug)]
#[command(name = "callvault", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Write every call item in the local database to a backup file.
    Archive {
        /// Destination of the frame stream.
        #[arg(long)]
        out: PathBuf,
    },
    /// Restore call items from a backup file into the local database.
    Restore {
        /// Frame stream to read.
        #[arg(long)]
        from: PathBuf,
    },
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => callvault_config::load_and_validate_path(path),
        None => callvault_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            callvault_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log.level);

    let result = match cli.command {
        Commands::Archive { out } => commands::run_archive(&config, &out).map(|_| ()),
        Commands::Restore { from } => commands::run_restore(&config, &from).map(|_| ()),
        Commands::CheckConfig => print_config(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("callvault: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Print the effective configuration so layering and env overrides can be checked.
fn print_config(config: &CallvaultConfig) -> Result<(), CallvaultError> {
    let rendered = callvault_config::to_toml_string(config)
        .map_err(|e| CallvaultError::Config(e.to_string()))?;
    eprintln!("callvault: configuration is valid");
    print!("{rendered}");
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "callvault={log_level},callvault_archive={log_level},callvault_storage={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn archive_requires_an_output_path() {
        assert!(Cli::try_parse_from(["callvault", "archive"]).is_err());

        let cli = Cli::try_parse_from(["callvault", "archive", "--out", "calls.jsonl"]).unwrap();
        match cli.command {
            Commands::Archive { out } => assert_eq!(out, PathBuf::from("calls.jsonl")),
            other => panic!("expected archive, got {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "callvault",
            "restore",
            "--from",
            "calls.jsonl",
            "--config",
            "/etc/callvault/alt.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/callvault/alt.toml")));
        assert!(matches!(cli.command, Commands::Restore { .. }));
    }
}
