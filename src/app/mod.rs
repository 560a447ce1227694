// Application layer - Playback controller and use case interactors

pub mod container;
pub mod playback_controller;
pub mod session;
pub mod source_interactor;
pub mod trim_interactor;

// Re-export interactors
pub use playback_controller::{ControllerNotice, PlaybackController};
pub use session::{PlaybackSession, SessionReport};
pub use source_interactor::SourceInteractor;
pub use trim_interactor::TrimInteractor;
