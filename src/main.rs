//! relwatch - release watcher
//!
//! Main entry point for the relwatch CLI.

mod cli;
mod cmd_check;
mod cmd_run;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use relwatch_config::ConfigLoader;

use cli::{Cli, Commands};

/// Initialize tracing.
///
/// `RUST_LOG` overrides `log_level`. With a `log_dir`, log lines are also
/// written to daily rolling files there.
fn init_tracing(log_level: &str, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("relwatch")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Keeps the writer flushing until exit.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false).boxed())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            init_tracing(&config.settings.log_level, Some(&config.settings.log_dir()))?;
            cmd_run::run(config).await
        }
        Commands::Check { service } => {
            init_tracing(&config.settings.log_level, None)?;
            cmd_check::check(&config, service.as_deref()).await
        }
        Commands::Validate => {
            init_tracing(&config.settings.log_level, None)?;
            cmd_check::validate(&config)
        }
    }
}
