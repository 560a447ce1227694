// Scene file adapter - Reads segment lists and media manifests from JSON or YAML

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// On-disk scene document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub segments: Vec<Segment>,
    /// Media manifest: source id or audio ref -> playable locator
    #[serde(default)]
    pub media: BTreeMap<String, ResolvedMedia>,
}

impl SceneDocument {
    /// Parse a document, picking the format from the file extension
    pub fn parse(content: &str, path: &Path) -> Result<Self, DomainError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        let document: SceneDocument = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(content).map_err(|e| {
                DomainError::BadArgs(format!("Invalid scene file {}: {}", path.display(), e))
            })?,
            Some("json") | None => serde_json::from_str(content).map_err(|e| {
                DomainError::BadArgs(format!("Invalid scene file {}: {}", path.display(), e))
            })?,
            Some(other) => {
                return Err(DomainError::BadArgs(format!(
                    "Unsupported scene file extension '{}'. Supported: json, yaml, yml",
                    other
                )))
            }
        };

        for segment in &document.segments {
            segment.validate()?;
        }
        Ok(document)
    }
}

/// Scene source backed by a file on disk
pub struct SceneFileAdapter {
    path: PathBuf,
}

impl SceneFileAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole document
    pub fn load_document(&self) -> Result<SceneDocument, DomainError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to read scene file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let document = SceneDocument::parse(&content, &self.path)?;
        debug!(
            path = %self.path.display(),
            segments = document.segments.len(),
            media = document.media.len(),
            "scene file loaded"
        );
        Ok(document)
    }
}

#[async_trait]
impl SceneSourcePort for SceneFileAdapter {
    async fn load_segments(&self) -> Result<Vec<Segment>, DomainError> {
        Ok(self.load_document()?.segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
segments:
  - id: intro
    source_id: clip-a
    source_start: 1.0
    source_end: 4.0
    voice_over:
      audio_ref: vo-intro
      natural_duration: 3.2
  - id: outro
    source_id: clip-b
    source_start: 0.0
    source_end: 2.5
media:
  clip-a: { url: "https://cdn/a.mp4", duration: 12.0 }
  clip-b: { url: "https://cdn/b.mp4" }
"#;

    #[test]
    fn test_parse_yaml() {
        let document = SceneDocument::parse(YAML, Path::new("scenes.yaml")).unwrap();
        assert_eq!(document.segments.len(), 2);
        assert_eq!(document.segments[0].id, SegmentId::new("intro"));
        assert_eq!(
            document.segments[0].voice_over.as_ref().map(|vo| vo.natural_duration),
            Some(3.2)
        );
        assert!(!document.segments[0].is_playable());
        assert_eq!(document.media["clip-a"].duration, Some(12.0));
        assert_eq!(document.media["clip-b"].duration, None);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"segments":[{"id":"a","source_id":"clip-a","source_start":0,"source_end":2}]}"#;
        let document = SceneDocument::parse(json, Path::new("scenes.json")).unwrap();
        assert_eq!(document.segments.len(), 1);
        assert!(document.media.is_empty());
    }

    #[test]
    fn test_rejects_invalid_segments_and_formats() {
        let json = r#"{"segments":[{"id":"a","source_id":"clip-a","source_start":3,"source_end":2}]}"#;
        assert!(matches!(
            SceneDocument::parse(json, Path::new("scenes.json")),
            Err(DomainError::InvalidSegment(_))
        ));
        assert!(SceneDocument::parse("{}", Path::new("scenes.txt")).is_err());
    }
}
