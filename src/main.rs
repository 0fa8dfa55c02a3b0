//! LobbyHands - unattended lobby keeper.
//!
//! Main entry point for the LobbyHands CLI.

mod cli;
mod cmd_admin;
mod cmd_run;
mod console;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lobbyhands_config::{ConfigLoader, ConfigValidator, LoggingConfig};

use crate::cli::{Cli, Commands};

/// Console plus daily-rolling file logging.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = logging.dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("lobbyhands")
        .filename_suffix("log")
        .max_log_files(logging.max_files.max(1))
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the writer flushing for the life of the process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(logging.filter_level()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(ConfigLoader::default_path);
    let config = ConfigLoader::load_or_default(&config_path)?;
    init_tracing(&config.logging)?;
    info!("Configuration: {}", config_path.display());

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("Config: {}", warning);
    }
    if !validation.is_valid() {
        for error in &validation.errors {
            error!("Config: {}", error);
        }
        return Err(format!(
            "invalid configuration ({} errors)",
            validation.errors.len()
        )
        .into());
    }

    match cli.command {
        None => cmd_run::run(config, true).await,
        Some(Commands::Run { no_console }) => cmd_run::run(config, !no_console).await,
        Some(Commands::Stats { json }) => cmd_admin::show_stats(&config, json).await,
        Some(Commands::ClearStats) => cmd_admin::clear_stats(&config).await,
        Some(Commands::Triggers { action }) => cmd_admin::triggers(&config, action).await,
        Some(Commands::Entities { action }) => cmd_admin::entities(&config, action).await,
    }
}
