//! Error handling module for sceneplay

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for sceneplay operations
#[derive(Error, Debug)]
pub enum SceneplayError {
    /// Domain rule or port failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Nothing in the composition can be played
    #[error("Composition has no playable segments")]
    NothingPlayable,

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML decoding error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML decoding error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for sceneplay operations
pub type SceneplayResult<T> = std::result::Result<T, SceneplayError>;
