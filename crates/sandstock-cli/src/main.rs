//! Sandstock CLI
//!
//! Main entry point for the `sandstock` binary.

use std::process::ExitCode;

use clap::Parser;
use sandstock_cli::cli::Cli;
use sandstock_common_config::{ConfigError, Environment, SandstockConfig};
use sandstock_common_log::{LogConfig, LogFormat, LogLevel};
use tracing::{debug, error};

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let env = Environment::init();
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return Exit::ConfigError.into();
        }
    };

    if let Err(e) = sandstock_common_log::init(log_config(&cli, &config)) {
        eprintln!("error: {e}");
        return Exit::ConfigError.into();
    }
    debug!(files = ?env.loaded(), "Loaded dotenv files");

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create Tokio runtime: {e}");
            return Exit::GeneralError.into();
        }
    };

    match runtime.block_on(sandstock_cli::run(&cli, &config)) {
        Ok(output) => {
            print!("{output}");
            Exit::Success.into()
        }
        Err(e) => {
            error!("{e:#}");
            if e.downcast_ref::<ConfigError>().is_some() {
                Exit::ConfigError.into()
            } else {
                Exit::GeneralError.into()
            }
        }
    }
}

/// File settings, then `SANDSTOCK_LOG_*` variables, then `-v` flags.
fn log_config(cli: &Cli, config: &SandstockConfig) -> LogConfig {
    let mut log = LogConfig::default();
    if let Some(level) = LogLevel::parse(&config.log.level) {
        log = log.with_level(level);
    }
    if let Ok(format) = config.log.format.parse::<LogFormat>() {
        log = log.with_format(format);
    }

    let log = log.with_env();
    if cli.verbose > 0 {
        log.with_level(LogLevel::from_verbosity(cli.verbose))
    } else {
        log
    }
}
