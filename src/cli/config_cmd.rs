//! Config CLI commands

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::Output;
use crate::storage::Config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,
}

pub fn run(
    cmd: ConfigCommands,
    output: &Output,
    config: &Config,
    override_path: Option<&Path>,
) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(output, config),
        ConfigCommands::Path => path(output, override_path),
    }
}

fn show(output: &Output, config: &Config) -> Result<()> {
    if output.is_json() {
        output.data(config);
    } else {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
        print!("{}", content);
    }

    Ok(())
}

fn path(output: &Output, override_path: Option<&Path>) -> Result<()> {
    let path = match override_path {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?,
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        }));
    } else {
        println!("{}", path.display());
    }

    Ok(())
}
