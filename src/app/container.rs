use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::adapters::{
    JsonTrimStore, ManifestResolver, MediaLibrary, SceneFileAdapter, SimulatedMedia,
};
use crate::app::{PlaybackController, PlaybackSession, SourceInteractor, TrimInteractor};
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::ports::{SceneSourcePort, SourceResolverPort, TrimPersistencePort};

/// Trim store used when no `--store` is given
pub const DEFAULT_TRIM_STORE: &str = "sceneplay-trims.json";

pub trait AppContainer: Send + Sync {
    fn config(&self) -> &PlaybackConfig;
    fn source_interactor(&self) -> Arc<SourceInteractor>;
    fn trim_store(&self) -> Arc<dyn TrimPersistencePort>;
}

/// Wires the file-backed adapters for one scene file
pub struct DefaultAppContainer {
    config: PlaybackConfig,
    scene_source: Arc<dyn SceneSourcePort>,
    source_interactor: Arc<SourceInteractor>,
    trim_store: Arc<dyn TrimPersistencePort>,
    library: MediaLibrary,
}

impl DefaultAppContainer {
    pub fn new(
        scene_path: &Path,
        store_path: Option<PathBuf>,
        config: PlaybackConfig,
    ) -> Result<Self, DomainError> {
        let scene_file = SceneFileAdapter::new(scene_path);
        let document = scene_file.load_document()?;
        let library = Self::media_library(&document.segments, &document.media);

        let resolver = Arc::new(ManifestResolver::new(document.media));
        let source_interactor = Arc::new(SourceInteractor::new(
            Arc::clone(&resolver) as Arc<dyn SourceResolverPort>
        ));

        let store_path = store_path.unwrap_or_else(|| PathBuf::from(DEFAULT_TRIM_STORE));
        debug!(store = %store_path.display(), "trim store selected");
        let trim_store = Arc::new(JsonTrimStore::new(store_path));

        Ok(Self {
            config,
            scene_source: Arc::new(scene_file) as Arc<dyn SceneSourcePort>,
            source_interactor,
            trim_store: trim_store as Arc<dyn TrimPersistencePort>,
            library,
        })
    }

    /// Simulator library: manifest durations, falling back to the longest use of each entry
    pub fn media_library(
        segments: &[Segment],
        media: &BTreeMap<String, ResolvedMedia>,
    ) -> MediaLibrary {
        let mut library = MediaLibrary::new();
        for (key, entry) in media {
            let used = segments
                .iter()
                .filter_map(|s| {
                    if &s.source_id == key {
                        Some(s.source_end)
                    } else {
                        s.voice_over
                            .as_ref()
                            .filter(|vo| &vo.audio_ref == key)
                            .map(|vo| vo.natural_duration)
                    }
                })
                .fold(0.0_f64, f64::max);
            library.insert(entry.url.clone(), entry.duration.unwrap_or(used));
        }
        library
    }

    /// Load the scene list and resolve it into a composition
    pub async fn load_composition(&self) -> Result<Composition, DomainError> {
        let segments = self.scene_source.load_segments().await?;
        self.source_interactor.resolve_composition(segments).await
    }

    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }

    /// Controller over a pair of simulated primitives
    pub fn simulated_controller(
        &self,
        composition: Composition,
    ) -> PlaybackController<SimulatedMedia, SimulatedMedia> {
        PlaybackController::new(
            SimulatedMedia::new("video", self.library.clone()),
            SimulatedMedia::new("audio", self.library.clone()),
            composition,
            self.config.clone(),
        )
    }

    pub fn simulated_session(
        &self,
        composition: Composition,
    ) -> PlaybackSession<SimulatedMedia, SimulatedMedia> {
        PlaybackSession::new(
            self.simulated_controller(composition),
            self.source_interactor(),
        )
    }

    pub fn trim_interactor(&self) -> TrimInteractor {
        TrimInteractor::new(self.trim_store())
    }
}

impl AppContainer for DefaultAppContainer {
    fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    fn source_interactor(&self) -> Arc<SourceInteractor> {
        Arc::clone(&self.source_interactor)
    }

    fn trim_store(&self) -> Arc<dyn TrimPersistencePort> {
        Arc::clone(&self.trim_store)
    }
}
