// Trim interactor - Drag sessions over segment bounds

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::playback_controller::PlaybackController;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

#[derive(Debug, Clone)]
struct ActiveDrag {
    segment_id: SegmentId,
    handle: TrimHandle,
    original: TrimEdit,
    current: TrimEdit,
    /// Outer limit for the end handle, fixed when the drag starts
    media_bound: f64,
}

/// Interactor for interactive trimming; at most one drag is active at a time
pub struct TrimInteractor {
    store: Arc<dyn TrimPersistencePort>,
    drag: Option<ActiveDrag>,
    last_saved: Option<(SegmentId, TrimEdit)>,
    /// Widest source end seen per segment; stands in for an unknown media length
    known_extents: HashMap<SegmentId, f64>,
}

impl TrimInteractor {
    /// Create new trim interactor with injected persistence
    pub fn new(store: Arc<dyn TrimPersistencePort>) -> Self {
        Self {
            store,
            drag: None,
            last_saved: None,
            known_extents: HashMap::new(),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Live bounds of the active drag
    pub fn current(&self) -> Option<TrimEdit> {
        self.drag.as_ref().map(|d| d.current)
    }

    /// Last edit handed to persistence
    pub fn last_saved(&self) -> Option<&(SegmentId, TrimEdit)> {
        self.last_saved.as_ref()
    }

    /// Start dragging one handle of a segment
    pub fn begin(
        &mut self,
        segment_id: &SegmentId,
        handle: TrimHandle,
        composition: &Composition,
    ) -> Result<TrimEdit, DomainError> {
        if let Some(active) = &self.drag {
            return Err(DomainError::DragInProgress(active.segment_id.to_string()));
        }
        let segment = composition
            .segment(segment_id)
            .ok_or_else(|| DomainError::UnknownSegment(segment_id.to_string()))?;

        let original = TrimEdit::new(segment.source_start, segment.source_end);
        let extent = self.known_extents.entry(segment_id.clone()).or_insert(0.0);
        *extent = extent.max(segment.media_duration());
        let media_bound = *extent;

        debug!(
            segment = %segment_id,
            ?handle,
            start = original.start,
            end = original.end,
            media_bound,
            "trim drag started"
        );
        self.drag = Some(ActiveDrag {
            segment_id: segment_id.clone(),
            handle,
            original,
            current: original,
            media_bound,
        });
        Ok(original)
    }

    /// Clamp a proposed handle position and apply it to the live composition
    pub fn update<V: MediaElement, A: MediaElement>(
        &mut self,
        proposed: f64,
        controller: &mut PlaybackController<V, A>,
    ) -> Result<TrimEdit, DomainError> {
        let drag = self.drag.as_mut().ok_or(DomainError::NoActiveDrag)?;
        let segment = controller
            .composition()
            .segment(&drag.segment_id)
            .ok_or_else(|| DomainError::UnknownSegment(drag.segment_id.to_string()))?;

        let voice_over = segment.voice_over.as_ref().map(|vo| vo.natural_duration);
        let edit = TrimConstraintSolver::clamp(
            drag.handle,
            proposed,
            drag.current,
            drag.media_bound,
            voice_over,
            controller.config(),
        );

        controller.apply_trim(&drag.segment_id, edit)?;
        drag.current = edit;
        Ok(edit)
    }

    /// End the drag and persist the final bounds
    ///
    /// A failed save is logged; the optimistic edit stays applied.
    pub async fn finish(&mut self) -> Result<TrimEdit, DomainError> {
        let drag = self.drag.take().ok_or(DomainError::NoActiveDrag)?;
        let edit = drag.current;

        match self.store.save_trim(&drag.segment_id, edit).await {
            Ok(()) => info!(
                segment = %drag.segment_id,
                start = edit.start,
                end = edit.end,
                "trim saved"
            ),
            Err(err) => warn!(segment = %drag.segment_id, %err, "trim not persisted, keeping local edit"),
        }
        self.last_saved = Some((drag.segment_id, edit));
        Ok(edit)
    }

    /// Abort the drag and restore the bounds it started from
    pub fn cancel<V: MediaElement, A: MediaElement>(
        &mut self,
        controller: &mut PlaybackController<V, A>,
    ) -> Result<(), DomainError> {
        let drag = self.drag.take().ok_or(DomainError::NoActiveDrag)?;
        debug!(segment = %drag.segment_id, "trim drag cancelled");
        controller.apply_trim(&drag.segment_id, drag.original)
    }
}
