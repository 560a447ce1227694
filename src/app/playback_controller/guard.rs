// Transition guard - suppresses native pause/ended while the controller drives a switch

use tracing::trace;

/// What started the guarded window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionReason {
    /// A segment is being loaded and started
    EnterSegment,
    /// Playback resumes inside the already-loaded segment
    Resume,
    /// The video reached its out-point
    BoundaryReached,
}

/// Reentrancy flag owned by the playback controller.
///
/// Engaged the instant a programmatic transition begins; released only when
/// the new segment's play request settles, on an explicit pause, or when the
/// transition ends without playing. While engaged, native `pause` and `ended`
/// callbacks on the video are side effects of the controller's own actions.
#[derive(Debug, Default)]
pub struct TransitionGuard {
    reason: Option<TransitionReason>,
}

impl TransitionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engage(&mut self, reason: TransitionReason) {
        trace!(?reason, "transition guard engaged");
        self.reason = Some(reason);
    }

    pub fn release(&mut self) {
        if let Some(reason) = self.reason.take() {
            trace!(?reason, "transition guard released");
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.reason.is_some()
    }

    pub fn reason(&self) -> Option<TransitionReason> {
        self.reason
    }
}

#[cfg(test)]
mod guard_tests {
    use super::*;

    #[test]
    fn test_guard_lifecycle() {
        let mut guard = TransitionGuard::new();
        assert!(!guard.is_engaged());

        guard.engage(TransitionReason::BoundaryReached);
        assert!(guard.is_engaged());
        assert_eq!(guard.reason(), Some(TransitionReason::BoundaryReached));

        guard.engage(TransitionReason::EnterSegment);
        assert_eq!(guard.reason(), Some(TransitionReason::EnterSegment));

        guard.release();
        assert!(!guard.is_engaged());
        guard.release();
        assert!(!guard.is_engaged());
    }
}
