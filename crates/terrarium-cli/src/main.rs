//! Terrarium CLI - Command-line interface
//!
//! Local geometry commands run offline; imagery commands open an Earth
//! Engine session from the configured credentials.

mod cli;
mod commands;
mod config_loader;
mod input;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Initialize tracing on stderr so JSON output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Adapters block on their own runtimes, so commands run synchronously
    commands::execute(cli)
}
