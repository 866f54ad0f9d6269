// ============================================================================
// Menu Admin - Command Line Entry Point
// File: crates/admin-cli/src/main.rs
// ============================================================================

mod cli;
mod commands;
mod response;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use admin_infrastructure::bootstrap;
use admin_shared::config::AppConfig;
use admin_shared::telemetry::init_telemetry;

use cli::Cli;
use response::CliError;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load()?;
    init_telemetry(config.app.log_format)?;

    info!(
        env = %config.app.env,
        storage = ?config.menu.storage,
        strategy = ?config.menu.strategy,
        code_scope = %config.menu.code_scope,
        "{} starting",
        config.app.name
    );

    let outcome = match bootstrap(&config).await {
        Ok(runtime) => commands::run(&runtime, cli.command).await,
        Err(e) => Err(CliError::from(e)),
    };

    if let Err(e) = &outcome {
        error!(code = e.code(), "Command failed: {}", e);
    }

    Ok(response::emit(outcome))
}
