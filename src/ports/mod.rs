// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Which of the two media primitives raised an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaChannel {
    Video,
    Audio,
}

/// Native callbacks of a media primitive
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Metadata loaded; seeks now land where requested
    Ready,
    /// Outcome of the last `request_play`
    PlaySettled(Result<(), String>),
    Pause,
    Ended,
    Seeking,
    /// Load or decode failure
    Error(String),
}

/// Capability interface of a media playback primitive.
///
/// Browser elements, native decoder bindings and the bundled simulator all
/// implement this. Every method returns immediately; outcomes of `load` and
/// `request_play` are reported later as [`MediaEvent`]s.
pub trait MediaElement {
    /// Currently loaded source URL
    fn source(&self) -> Option<&str>;

    /// Start loading a new source; position resets to zero
    fn load(&mut self, url: &str);

    /// Drop the current source
    fn unload(&mut self);

    fn is_ready(&self) -> bool;

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    /// Natural length of the loaded media, once known
    fn duration(&self) -> Option<f64>;

    fn playback_rate(&self) -> f64;

    fn set_playback_rate(&mut self, rate: f64);

    fn set_muted(&mut self, muted: bool);

    fn is_muted(&self) -> bool;

    fn is_paused(&self) -> bool;

    fn is_ended(&self) -> bool;

    /// Ask the primitive to start; settles with [`MediaEvent::PlaySettled`]
    fn request_play(&mut self);

    fn pause(&mut self);
}

/// A media primitive whose clock and callbacks are pumped by the host
pub trait MediaPipeline: MediaElement {
    /// Advance the media clock by `dt` wall-clock seconds
    fn advance(&mut self, dt: f64);

    /// Callbacks raised since the last call, oldest first
    fn take_events(&mut self) -> Vec<MediaEvent>;
}

/// Port for the scene list produced upstream
#[async_trait]
pub trait SceneSourcePort: Send + Sync {
    /// Load the ordered segment list; media is left unresolved
    async fn load_segments(&self) -> Result<Vec<Segment>, DomainError>;
}

/// Port for turning source ids into playable URLs
#[async_trait]
pub trait SourceResolverPort: Send + Sync {
    /// Resolve a video source id
    async fn resolve_source(&self, source_id: &str) -> Result<ResolvedMedia, DomainError>;

    /// Resolve a voice-over audio reference
    async fn resolve_audio(&self, audio_ref: &str) -> Result<ResolvedMedia, DomainError>;
}

/// Port for persisting finalized trims
#[async_trait]
pub trait TrimPersistencePort: Send + Sync {
    async fn save_trim(&self, segment_id: &SegmentId, edit: TrimEdit) -> Result<(), DomainError>;
}

/// Port for configuration management
#[async_trait]
pub trait ConfigPort: Send + Sync {
    /// Load configuration from a TOML file, layering it over the defaults
    async fn load_config(&self, file_path: &Path) -> Result<PlaybackConfig, DomainError>;

    /// Defaults with environment overrides applied
    async fn load_default_config(&self) -> Result<PlaybackConfig, DomainError>;
}
