//! Sandstock command line interface.
//!
//! The binary is a thin wrapper around [`run`]; integration tests drive
//! the same entry point.

pub mod app;
pub mod cli;
pub mod commands;

use app::App;
use cli::{Cli, Command};
use sandstock_common_config::SandstockConfig;
use sandstock_common_log::spans::store_span;
use tracing::{debug, Instrument};

/// Execute the parsed command against `config` and return its rendered
/// report.
pub async fn run(cli: &Cli, config: &SandstockConfig) -> anyhow::Result<String> {
    let app = App::open(config).await?;
    let result = execute(&cli.command, &app).await;

    // Shut down even when the command failed so queued change logs are flushed.
    let shutdown = app.shutdown().await;
    let output = result?;
    if let Some(stats) = shutdown? {
        debug!(?stats, "Queued change logs flushed");
    }
    Ok(output)
}

async fn execute(command: &Command, app: &App) -> anyhow::Result<String> {
    let output = match command {
        Command::Migrate(cmd) => cmd.execute(app).instrument(store_span("migrate")).await?.to_string(),
        Command::Seed(cmd) => cmd.execute(app).instrument(store_span("seed")).await?.to_string(),
        Command::Restock(cmd) => cmd.execute(app).instrument(store_span("restock")).await?.to_string(),
        Command::Changes(cmd) => cmd.execute(app).instrument(store_span("changes")).await?.to_string(),
    };
    Ok(output)
}
