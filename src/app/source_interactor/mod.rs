// Source interactor - Resolves scene media references into playable locators

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Locator schemes that name storage, not something a player can fetch
const STORAGE_SCHEMES: &[&str] = &["gs://", "s3://", "az://", "abfs://", "hdfs://"];

/// Schemes a media primitive can play directly
const PLAYABLE_SCHEMES: &[&str] = &["https://", "http://", "file://", "blob:", "data:"];

/// Interactor for turning scene lists into a playable composition
pub struct SourceInteractor {
    resolver: Arc<dyn SourceResolverPort>,
}

impl SourceInteractor {
    /// Create new source interactor with injected resolver
    pub fn new(resolver: Arc<dyn SourceResolverPort>) -> Self {
        Self { resolver }
    }

    /// Reject storage locators and bare paths
    pub fn ensure_playable(url: &str) -> Result<(), DomainError> {
        let lowered = url.trim().to_lowercase();
        if STORAGE_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
            return Err(DomainError::NotPlayable(format!(
                "storage locator cannot be played directly: {}",
                url
            )));
        }
        if !PLAYABLE_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
            return Err(DomainError::NotPlayable(format!(
                "unsupported locator: {}",
                url
            )));
        }
        Ok(())
    }

    /// Resolve every segment; failures leave the segment degenerate rather than aborting
    pub async fn resolve_composition(
        &self,
        segments: Vec<Segment>,
    ) -> Result<Composition, DomainError> {
        let mut resolved = Vec::with_capacity(segments.len());
        let mut failures = 0usize;

        for mut segment in segments {
            segment.media = match self.resolve_video(&segment.source_id).await {
                Ok(media) => SourceMedia::Resolved(media),
                Err(err) => {
                    failures += 1;
                    warn!(segment = %segment.id, source = %segment.source_id, %err, "source unresolved");
                    SourceMedia::Failed {
                        reason: err.to_string(),
                    }
                }
            };

            if let Some(vo) = segment.voice_over.as_mut() {
                vo.url = match self.resolve_voice_over(&vo.audio_ref).await {
                    Ok(media) => Some(media.url),
                    Err(err) => {
                        warn!(segment = %segment.id, audio = %vo.audio_ref, %err, "voice-over unresolved, playing without it");
                        None
                    }
                };
            }
            resolved.push(segment);
        }

        info!(
            segments = resolved.len(),
            failures, "composition sources resolved"
        );
        Composition::new(resolved)
    }

    /// One bounded retry for a segment whose media failed to load
    pub async fn reresolve(&self, source_id: &str) -> Result<ResolvedMedia, DomainError> {
        debug!(source = source_id, "re-resolving source");
        self.resolve_video(source_id).await
    }

    async fn resolve_video(&self, source_id: &str) -> Result<ResolvedMedia, DomainError> {
        let media = self.resolver.resolve_source(source_id).await?;
        Self::ensure_playable(&media.url)?;
        Ok(media)
    }

    async fn resolve_voice_over(&self, audio_ref: &str) -> Result<ResolvedMedia, DomainError> {
        let media = self.resolver.resolve_audio(audio_ref).await?;
        Self::ensure_playable(&media.url)?;
        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct TableResolver {
        table: HashMap<String, String>,
    }

    #[async_trait]
    impl SourceResolverPort for TableResolver {
        async fn resolve_source(&self, source_id: &str) -> Result<ResolvedMedia, DomainError> {
            self.table
                .get(source_id)
                .map(|url| ResolvedMedia {
                    url: url.clone(),
                    duration: Some(20.0),
                })
                .ok_or_else(|| DomainError::Unresolvable(source_id.to_string()))
        }

        async fn resolve_audio(&self, audio_ref: &str) -> Result<ResolvedMedia, DomainError> {
            self.resolve_source(audio_ref).await
        }
    }

    fn interactor(pairs: &[(&str, &str)]) -> SourceInteractor {
        let table = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SourceInteractor::new(Arc::new(TableResolver { table }))
    }

    #[test]
    fn test_ensure_playable() {
        assert!(SourceInteractor::ensure_playable("https://cdn/a.mp4").is_ok());
        assert!(SourceInteractor::ensure_playable("file:///tmp/a.mp4").is_ok());
        assert!(matches!(
            SourceInteractor::ensure_playable("gs://bucket/a.mp4"),
            Err(DomainError::NotPlayable(_))
        ));
        assert!(SourceInteractor::ensure_playable("/tmp/a.mp4").is_err());
    }

    #[tokio::test]
    async fn test_resolve_composition_marks_failures_degenerate() {
        let interactor = interactor(&[
            ("clip-a", "https://cdn/a.mp4"),
            ("clip-b", "s3://bucket/b.mp4"),
            ("vo-a", "https://cdn/vo-a.mp3"),
        ]);
        let segments = vec![
            Segment::new("a", "clip-a", 0.0, 3.0)
                .unwrap()
                .with_voice_over(VoiceOver::new("vo-a", 3.0)),
            Segment::new("b", "clip-b", 0.0, 3.0).unwrap(),
            Segment::new("c", "clip-missing", 0.0, 3.0)
                .unwrap()
                .with_voice_over(VoiceOver::new("vo-missing", 3.0)),
        ];

        let composition = interactor.resolve_composition(segments).await.unwrap();

        assert!(composition.is_playable(0));
        assert_eq!(composition.get(0).unwrap().voice_over_url(), Some("https://cdn/vo-a.mp3"));
        assert!(!composition.is_playable(1));
        assert!(!composition.is_playable(2));
        assert_eq!(composition.get(2).unwrap().voice_over_url(), None);
    }

    #[tokio::test]
    async fn test_reresolve() {
        let interactor = interactor(&[("clip-a", "https://cdn/a.mp4")]);
        assert_eq!(
            interactor.reresolve("clip-a").await.unwrap().url,
            "https://cdn/a.mp4"
        );
        assert!(interactor.reresolve("clip-z").await.is_err());
    }
}
