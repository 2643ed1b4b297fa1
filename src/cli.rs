//! CLI definitions for relwatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// relwatch CLI.
#[derive(Parser)]
#[command(name = "relwatch")]
#[command(about = "Watches services for new releases and tells you about them")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RELWATCH_CONFIG", default_value = "config/relwatch.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Watch every service until interrupted (default)
    Run,

    /// Query versions once and print them, without saving or notifying
    Check {
        /// Only this service
        #[arg(short, long)]
        service: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}
