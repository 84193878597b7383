// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strongbox - a credential vault with envelope encryption.
//!
//! This is the binary entry point for the `strongbox` command.

mod items;
mod progress;
mod rotate;
mod secret;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use strongbox_config::model::StrongboxConfig;
use strongbox_core::{Scope, StrongboxError};
use strongbox_vault::prompt::{NEW_PASSPHRASE_ENV_VAR, PASSPHRASE_ENV_VAR};
use strongbox_vault::{get_new_passphrase, get_passphrase};

/// Strongbox - a credential vault with envelope encryption.
#[derive(Parser, Debug)]
#[command(name = "strongbox", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the vault and set the master passphrase.
    Init,
    /// Store a new item. The secret is read from the terminal or stdin.
    Add { name: String },
    /// Replace an item's secret, keeping the old one in history.
    Update { name: String },
    /// Print an item's secret.
    Show { name: String },
    /// List item names.
    List,
    /// List the stored history of one item.
    History { name: String },
    /// Delete an item, keeping its last secret in history.
    Delete { name: String },
    /// Re-wrap every record under a new master passphrase.
    Rotate {
        /// Which tables to rotate.
        #[arg(long, default_value = "both")]
        scope: Scope,
        /// Report what would be rotated without writing anything.
        #[arg(long)]
        demo: bool,
        /// Write the JSON report and notification to this file.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Print one line per record.
        #[arg(long, short)]
        verbose: bool,
    },
    /// Clear the vault lock left by a rotation that was killed.
    Unlock,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => strongbox_config::load_and_validate_path(path),
        None => strongbox_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            strongbox_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.general.log_level);

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: StrongboxConfig) -> Result<ExitCode, StrongboxError> {
    match command {
        Commands::Init => {
            let passphrase = get_new_passphrase(PASSPHRASE_ENV_VAR)?;
            items::run_init(&config, &passphrase).await?;
            eprintln!("Vault initialized at {}", config.storage.database_path);
        }
        Commands::Add { name } => {
            let passphrase = get_passphrase()?;
            let value = secret::read_secret(&name)?;
            items::run_add(&config, &passphrase, &name, &value).await?;
            eprintln!("Added {name}");
        }
        Commands::Update { name } => {
            let passphrase = get_passphrase()?;
            let value = secret::read_secret(&name)?;
            items::run_update(&config, &passphrase, &name, &value).await?;
            eprintln!("Updated {name}");
        }
        Commands::Show { name } => {
            let passphrase = get_passphrase()?;
            let value = items::run_show(&config, &passphrase, &name).await?;
            println!("{}", String::from_utf8_lossy(&value));
        }
        Commands::List => {
            for line in items::run_list(&config).await? {
                println!("{line}");
            }
        }
        Commands::History { name } => {
            for line in items::run_history(&config, &name).await? {
                println!("{line}");
            }
        }
        Commands::Delete { name } => {
            items::run_delete(&config, &name).await?;
            eprintln!("Deleted {name}");
        }
        Commands::Rotate {
            scope,
            demo,
            report,
            verbose,
        } => {
            let old_passphrase = get_passphrase()?;
            let new_passphrase = get_new_passphrase(NEW_PASSPHRASE_ENV_VAR)?;
            let args = rotate::RotateArgs {
                scope,
                demo,
                report_path: report,
                verbose,
            };
            let cancel = rotate::install_signal_handler();
            let outcome =
                rotate::run_rotate(&config, &args, old_passphrase, new_passphrase, &cancel).await?;
            rotate::print_outcome(&outcome);
            return Ok(outcome.exit_code());
        }
        Commands::Unlock => match rotate::run_unlock(&config).await? {
            Some(holder) => eprintln!("Cleared rotation lock ({holder})"),
            None => eprintln!("Vault was not locked"),
        },
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("strongbox={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
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
    fn rotate_defaults_to_both_scopes() {
        let cli = Cli::try_parse_from(["strongbox", "rotate"]).unwrap();
        match cli.command {
            Commands::Rotate {
                scope, demo, report, ..
            } => {
                assert_eq!(scope, Scope::Both);
                assert!(!demo);
                assert!(report.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rotate_parses_scope_and_flags() {
        let cli = Cli::try_parse_from([
            "strongbox",
            "--config",
            "vault.toml",
            "rotate",
            "--scope",
            "history",
            "--demo",
            "--report",
            "out.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("vault.toml")));
        match cli.command {
            Commands::Rotate {
                scope, demo, report, ..
            } => {
                assert_eq!(scope, Scope::History);
                assert!(demo);
                assert_eq!(report, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unlock_takes_no_arguments() {
        let cli = Cli::try_parse_from(["strongbox", "unlock"]).unwrap();
        assert!(matches!(cli.command, Commands::Unlock));
        assert!(Cli::try_parse_from(["strongbox", "unlock", "now"]).is_err());
    }

    #[test]
    fn unknown_scope_is_rejected() {
        assert!(Cli::try_parse_from(["strongbox", "rotate", "--scope", "archive"]).is_err());
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = strongbox_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.general.vault_name, "strongbox");
    }
}
