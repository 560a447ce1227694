// Adapters - External system implementations

pub mod json_trim_store;
pub mod manifest_resolver;
pub mod scene_file;
pub mod simulated_media;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use json_trim_store::JsonTrimStore;
pub use manifest_resolver::ManifestResolver;
pub use scene_file::{SceneDocument, SceneFileAdapter};
pub use simulated_media::{MediaLibrary, SimulatedMedia};
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::init_logging;
