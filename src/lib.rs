//! sceneplay - Segment playback and synchronization engine
//!
//! Plays an ordered list of trimmed video segments as one continuous
//! timeline through a single video primitive, keeps an optional voice-over
//! track in step with each segment, and clamps interactive trims so that
//! narrated segments stay close to their voice-over length.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use app::{ControllerNotice, PlaybackController, PlaybackSession, SourceInteractor, TrimInteractor};
pub use domain::errors::DomainError;
pub use domain::model::{
    Composition, PlaybackConfig, PlaybackSnapshot, PlaybackState, Segment, SegmentId, TrimEdit,
    TrimHandle, VoiceOver,
};
pub use domain::rules::{RateSynchronizer, TimelineMap, TimelineMapper, TrimConstraintSolver};
pub use error::{SceneplayError, SceneplayResult};
pub use ports::{MediaChannel, MediaElement, MediaEvent, MediaPipeline};
