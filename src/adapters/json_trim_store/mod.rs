// JSON trim store adapter - Persists finalized trims to a JSON file

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// One persisted trim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTrim {
    pub start: f64,
    pub end: f64,
    pub saved_at: DateTime<Utc>,
}

/// Trim store writing `segment_id -> { start, end, saved_at }` atomically
pub struct JsonTrimStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonTrimStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored trim; a missing file is an empty store
    pub fn load_all(&self) -> Result<BTreeMap<SegmentId, StoredTrim>, DomainError> {
        read_trims(&self.path)
    }
}

fn read_trims(path: &Path) -> Result<BTreeMap<SegmentId, StoredTrim>, DomainError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = std::fs::read_to_string(path).map_err(|e| {
        DomainError::PersistenceFailed(format!(
            "Failed to read trim store {}: {}",
            path.display(),
            e
        ))
    })?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&content).map_err(|e| {
        DomainError::PersistenceFailed(format!("Corrupt trim store {}: {}", path.display(), e))
    })
}

fn write_trims(path: &Path, trims: &BTreeMap<SegmentId, StoredTrim>) -> Result<(), DomainError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .map_err(|e| DomainError::FsFail(format!("Failed to create store directory: {}", e)))?;

    let json = serde_json::to_string_pretty(trims)
        .map_err(|e| DomainError::PersistenceFailed(format!("Failed to encode trims: {}", e)))?;

    let mut temp = NamedTempFile::new_in(&dir)
        .map_err(|e| DomainError::FsFail(format!("Failed to create temp file: {}", e)))?;
    temp.write_all(json.as_bytes())
        .map_err(|e| DomainError::FsFail(format!("Failed to write temp file: {}", e)))?;
    temp.persist(path).map_err(|e| {
        DomainError::PersistenceFailed(format!("Failed to replace {}: {}", path.display(), e.error))
    })?;
    Ok(())
}

#[async_trait]
impl TrimPersistencePort for JsonTrimStore {
    async fn save_trim(&self, segment_id: &SegmentId, edit: TrimEdit) -> Result<(), DomainError> {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        let key = segment_id.clone();

        // Read-modify-write runs off the async workers; the lock keeps cycles ordered
        tokio::task::spawn_blocking(move || {
            let mut trims = read_trims(&path)?;
            trims.insert(
                key,
                StoredTrim {
                    start: edit.start,
                    end: edit.end,
                    saved_at: Utc::now(),
                },
            );
            write_trims(&path, &trims)
        })
        .await
        .map_err(|e| DomainError::PersistenceFailed(format!("Trim writer task failed: {}", e)))??;

        debug!(segment = %segment_id, path = %self.path.display(), "trim written");
        Ok(())
    }
}
