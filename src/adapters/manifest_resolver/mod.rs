// Manifest resolver adapter - Resolves source ids from a scene media table

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::trace;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Resolver backed by a static id -> locator table
#[derive(Debug, Clone, Default)]
pub struct ManifestResolver {
    media: BTreeMap<String, ResolvedMedia>,
}

impl ManifestResolver {
    pub fn new(media: BTreeMap<String, ResolvedMedia>) -> Self {
        Self { media }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &ResolvedMedia)> {
        self.media.iter()
    }

    fn lookup(&self, key: &str) -> Result<ResolvedMedia, DomainError> {
        trace!(key, "manifest lookup");
        self.media
            .get(key)
            .cloned()
            .ok_or_else(|| DomainError::Unresolvable(format!("{} is not in the media manifest", key)))
    }
}

#[async_trait]
impl SourceResolverPort for ManifestResolver {
    async fn resolve_source(&self, source_id: &str) -> Result<ResolvedMedia, DomainError> {
        self.lookup(source_id)
    }

    async fn resolve_audio(&self, audio_ref: &str) -> Result<ResolvedMedia, DomainError> {
        self.lookup(audio_ref)
    }
}
