//! parcelnorm CLI - Command-line interface
//!
//! Runs the polygon normalization and conflict-resolution pipeline over a
//! JSON file of raw parcel records.

mod cli;
mod commands;
mod export;
mod output;
mod output_types;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    commands::execute(cli)
}
