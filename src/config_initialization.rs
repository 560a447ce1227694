//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::domain::model::PlaybackConfig;
use crate::ports::ConfigPort;

/// Resolve the playback configuration with precedence CLI > Env > File > Defaults
pub async fn initialize_configuration(
    config_port: &dyn ConfigPort,
    cli: &Cli,
) -> Result<PlaybackConfig> {
    // File and environment layers
    let mut config = match &cli.config {
        Some(path) => config_port
            .load_config(path)
            .await
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => config_port
            .load_default_config()
            .await
            .context("Failed to load default configuration")?,
    };

    // CLI layer
    if let Some(tick_ms) = cli.command.tick_ms() {
        debug!(tick_ms, "tick interval from command line");
        config.tick_interval_ms = tick_ms;
    }
    config.validate().context("Invalid configuration")?;

    info!(
        tick_ms = config.tick_interval_ms,
        max_audio_rate = config.max_audio_rate,
        "configuration initialized"
    );
    Ok(config)
}
