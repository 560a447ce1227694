//! sceneplay CLI
//!
//! Plays, inspects and trims multi-segment compositions described by a
//! scene file.
//!
//! # Usage
//!
//! ```bash
//! sceneplay inspect --scenes story.yaml
//! sceneplay play --scenes story.yaml --seek 0:12.5
//! sceneplay trim --scenes story.yaml --segment intro --handle end --to 4.2
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use sceneplay::adapters::{init_logging, TomlConfigAdapter};
use sceneplay::cli::{commands, Cli, Commands};
use sceneplay::config_initialization::initialize_configuration;

/// Main entry point for the sceneplay CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs)?;

    info!("Starting sceneplay");
    let config_port = TomlConfigAdapter::new();
    let config = initialize_configuration(&config_port, &cli).await?;

    match cli.command {
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            commands::inspect(args, config).await?;
        }
        Commands::Play(args) => {
            info!("Executing play command");
            commands::play(args, config).await?;
        }
        Commands::Trim(args) => {
            info!("Executing trim command");
            commands::trim(args, config).await?;
        }
    }

    info!("sceneplay completed successfully");
    Ok(())
}
