// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ActionHub - plugin catalog and two-phase execution engine.
//!
//! Every subcommand prints one JSON document to stdout. Failures print an
//! error document carrying the HTTP-equivalent status and exit non-zero.

mod app;
mod commands;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use actionhub_core::ActionHubError;
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::app::App;

/// ActionHub - plugin catalog and two-phase execution engine.
#[derive(Parser, Debug)]
#[command(name = "actionhub", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered services.
    Services,
    /// List the plugins of a service.
    Plugins { service_id: String },
    /// Show default configuration and form of a plugin.
    Form {
        service_id: String,
        plugin_id: String,
    },
    /// Show the remote descriptor of a service.
    Registry { service_id: String },
    /// Validate configuration data (JSON, or `-` for stdin) against a plugin's schema.
    Validate {
        service_id: String,
        plugin_id: String,
        config: String,
    },
    /// Run a plugin with an execution request `{context, init, params}` (JSON, or `-`).
    Run {
        service_id: String,
        plugin_id: String,
        request: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => actionhub_config::load_and_validate_path(path),
        None => actionhub_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            actionhub_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.engine.log_level);

    match execute(cli.command, &config).await {
        Ok(output) => {
            println!("{}", pretty(&output));
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", pretty(&commands::error_body(&err)));
            ExitCode::FAILURE
        }
    }
}

async fn execute(
    command: Commands,
    config: &actionhub_config::ActionHubConfig,
) -> Result<Value, ActionHubError> {
    let app = App::from_config(config)?;

    match command {
        Commands::Services => commands::services(&app.catalog),
        Commands::Plugins { service_id } => commands::plugins(&app.catalog, &service_id),
        Commands::Form {
            service_id,
            plugin_id,
        } => commands::form(&app.catalog, &service_id, &plugin_id),
        Commands::Registry { service_id } => commands::registry(&app.catalog, &service_id),
        Commands::Validate {
            service_id,
            plugin_id,
            config,
        } => {
            let payload = commands::read_json_arg(&config)?;
            commands::validate(&app.catalog, &service_id, &plugin_id, &payload)
        }
        Commands::Run {
            service_id,
            plugin_id,
            request,
        } => {
            let request = commands::read_json_arg(&request)?;
            let cancel = shutdown::install_signal_handler();
            commands::run(&app.engine, &service_id, &plugin_id, request, cancel).await
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Logs go to stderr so stdout stays a single JSON document.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("actionhub={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
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
    fn run_subcommand_parses_positionals() {
        let cli = Cli::try_parse_from(["actionhub", "run", "S1", "P1", "{}"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Run { ref service_id, ref plugin_id, .. } if service_id == "S1" && plugin_id == "P1"
        ));
    }

    #[tokio::test]
    async fn builtin_catalog_is_listed_with_default_config() {
        let config = actionhub_config::ActionHubConfig::default();
        let out = execute(Commands::Services, &config).await.unwrap();
        assert_eq!(out["total"], 1);
        assert_eq!(
            out["result"][actionhub_engine::TRELLO_SERVICE_ID],
            "Trello"
        );
    }
}
