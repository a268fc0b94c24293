//! calmerge CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use calmerge_cli::cli::{Cli, Command, ConfigAction, SourcesAction};
use calmerge_cli::commands::{self, sources::NewSource};
use calmerge_cli::config::ClientConfig;
use calmerge_cli::error::ClientResult;
use calmerge_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            e.exit_code()
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.unwrap_or_else(ClientConfig::default_path);
    let config = if config_path.exists() {
        ClientConfig::load_from(&config_path)?
    } else {
        debug!(path = %config_path.display(), "no config file, using defaults");
        ClientConfig::default()
    };

    match cli.command {
        Command::Sync { json } => commands::sync::run(&config, json).await,
        Command::Watch { interval } => commands::watch::run(&config, interval).await,
        Command::Sources { action } => match action {
            SourcesAction::List { json } => commands::sources::list(&config, json).await,
            SourcesAction::Add {
                id,
                kind,
                name,
                color,
                token,
                calendar_id,
                disabled,
            } => {
                commands::sources::add(
                    &config,
                    NewSource {
                        id,
                        kind,
                        name,
                        color,
                        token,
                        calendar_id,
                        disabled,
                    },
                )
                .await
            }
            SourcesAction::Enable { id } => commands::sources::toggle(&config, &id, true).await,
            SourcesAction::Disable { id } => commands::sources::toggle(&config, &id, false).await,
        },
        Command::Timeline {
            date,
            scroll,
            jump,
            json,
        } => commands::timeline::run(&config, date.as_deref(), &scroll, jump.as_deref(), json),
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config, &config_path),
        },
    }
}
