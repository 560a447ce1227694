// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),
    /// Segment violates its structural invariants
    #[error("Invalid segment: {0}")]
    InvalidSegment(String),
    /// Segment id not present in the composition
    #[error("Unknown segment: {0}")]
    UnknownSegment(String),
    /// A trim drag is already running on another handle
    #[error("Trim drag already in progress on segment {0}")]
    DragInProgress(String),
    /// Drag operation issued without a running drag
    #[error("No trim drag in progress")]
    NoActiveDrag,
    /// Source id could not be turned into a playable URL
    #[error("Unresolvable source: {0}")]
    Unresolvable(String),
    /// Resolved locator is not something a media primitive can play
    #[error("Not playable: {0}")]
    NotPlayable(String),
    /// Trim persistence collaborator failed
    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// File system operation failed
    #[error("File system failure: {0}")]
    FsFail(String),
}
