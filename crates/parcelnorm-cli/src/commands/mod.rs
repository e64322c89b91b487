//! Command implementations

mod config;
mod run;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use parcelnorm_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::Path;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match cli.command {
        Commands::Run(args) => run::execute(args, &output),
        Commands::Config(args) => config::execute(args, &output),
    }
}

/// Build the layered configuration: defaults, then file, then environment, then CLI
fn load_layered_config(
    config_path: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut layered = LayeredConfig::with_defaults();

    if let Some(path) = config_path {
        layered = layered
            .load_from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
    }

    let mut layered = layered.load_from_env();
    layered.update_from_cli(overrides);
    Ok(layered)
}
