// TOML config adapter - Playback configuration from TOML files and environment

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "sceneplay.toml";

/// Prefix of environment overrides, e.g. `SCENEPLAY_MAX_AUDIO_RATE`
pub const ENV_PREFIX: &str = "SCENEPLAY_";

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    playback: PlaybackConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    /// Environment snapshot; injected in tests
    env: HashMap<String, String>,
}

impl TomlConfigAdapter {
    /// Create an adapter reading overrides from the process environment
    pub fn new() -> Self {
        Self::with_env(std::env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX)))
    }

    /// Create an adapter with an explicit environment
    pub fn with_env<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            env: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get default config file path
    pub fn default_config_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Parse the `[playback]` table of a TOML document
    pub fn parse(content: &str) -> Result<PlaybackConfig, DomainError> {
        let document: ConfigDocument = toml::from_str(content)
            .map_err(|e| DomainError::ConfigError(format!("Failed to parse TOML config: {}", e)))?;
        Ok(document.playback)
    }

    /// Layer `SCENEPLAY_*` variables over a config
    pub fn apply_env(&self, config: &mut PlaybackConfig) -> Result<(), DomainError> {
        if let Some(value) = self.float_var("AUDIO_TAIL_TOLERANCE")? {
            config.audio_tail_tolerance = value;
        }
        if let Some(value) = self.float_var("MIN_SEGMENT_DURATION")? {
            config.min_segment_duration = value;
        }
        if let Some(value) = self.float_var("VOICE_OVER_TOLERANCE")? {
            config.voice_over_tolerance = value;
        }
        if let Some(value) = self.float_var("MAX_AUDIO_RATE")? {
            config.max_audio_rate = value;
        }
        if let Some(value) = self.var("MAX_LOAD_RETRIES") {
            config.max_load_retries = value.parse().map_err(|e| {
                DomainError::ConfigError(format!("Invalid {}MAX_LOAD_RETRIES: {}", ENV_PREFIX, e))
            })?;
        }
        if let Some(value) = self.var("TICK_INTERVAL_MS") {
            config.tick_interval_ms = value.parse().map_err(|e| {
                DomainError::ConfigError(format!("Invalid {}TICK_INTERVAL_MS: {}", ENV_PREFIX, e))
            })?;
        }
        Ok(())
    }

    fn var(&self, key: &str) -> Option<&str> {
        self.env
            .get(&format!("{}{}", ENV_PREFIX, key))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn float_var(&self, key: &str) -> Result<Option<f64>, DomainError> {
        self.var(key)
            .map(|value| {
                value.parse::<f64>().map_err(|e| {
                    DomainError::ConfigError(format!("Invalid {}{}: {}", ENV_PREFIX, key, e))
                })
            })
            .transpose()
    }

    fn finalize(&self, mut config: PlaybackConfig) -> Result<PlaybackConfig, DomainError> {
        self.apply_env(&mut config)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigPort for TomlConfigAdapter {
    async fn load_config(&self, file_path: &Path) -> Result<PlaybackConfig, DomainError> {
        if !file_path.exists() {
            return Err(DomainError::FsFail(format!(
                "Config file does not exist: {}",
                file_path.display()
            )));
        }
        let content = tokio::fs::read_to_string(file_path)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to read config file: {}", e)))?;

        let config = self.finalize(Self::parse(&content)?)?;
        info!(path = %file_path.display(), "configuration loaded");
        Ok(config)
    }

    async fn load_default_config(&self) -> Result<PlaybackConfig, DomainError> {
        let path = Self::default_config_path();
        if path.exists() {
            return self.load_config(&path).await;
        }
        debug!("no config file, using defaults");
        self.finalize(PlaybackConfig::default())
    }
}
