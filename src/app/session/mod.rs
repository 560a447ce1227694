// Playback session - Drives a controller over host-pumped media pipelines

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::playback_controller::{ControllerNotice, PlaybackController};
use crate::app::source_interactor::SourceInteractor;
use crate::domain::model::*;
use crate::ports::*;

/// Event dispatch rounds per step; each round may queue follow-up callbacks
const MAX_DISPATCH_ROUNDS: usize = 16;

/// Summary of a [`PlaybackSession::run`]
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Simulated wall-clock seconds consumed
    pub elapsed: f64,
    /// The composition played through to its end
    pub finished: bool,
    pub notices: Vec<ControllerNotice>,
    pub snapshot: PlaybackSnapshot,
}

/// Owns a controller and pumps its pipelines at a fixed tick
pub struct PlaybackSession<V, A> {
    controller: PlaybackController<V, A>,
    sources: Arc<SourceInteractor>,
    elapsed: f64,
}

impl<V: MediaPipeline, A: MediaPipeline> PlaybackSession<V, A> {
    pub fn new(controller: PlaybackController<V, A>, sources: Arc<SourceInteractor>) -> Self {
        Self {
            controller,
            sources,
            elapsed: 0.0,
        }
    }

    pub fn controller(&self) -> &PlaybackController<V, A> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController<V, A> {
        &mut self.controller
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Deliver queued callbacks of both pipelines to the controller
    pub fn dispatch_events(&mut self) {
        for _ in 0..MAX_DISPATCH_ROUNDS {
            let video_events = self.controller.video_mut().take_events();
            let audio_events = self.controller.audio_mut().take_events();
            if video_events.is_empty() && audio_events.is_empty() {
                return;
            }
            for event in video_events {
                self.controller.handle_event(MediaChannel::Video, event);
            }
            for event in audio_events {
                self.controller.handle_event(MediaChannel::Audio, event);
            }
        }
        debug!("event dispatch round limit reached, deferring to next step");
    }

    /// Advance by `dt` seconds: move media clocks, dispatch callbacks, tick, service notices
    pub async fn step(&mut self, dt: f64) -> Vec<ControllerNotice> {
        self.controller.video_mut().advance(dt);
        self.controller.audio_mut().advance(dt);
        self.elapsed += dt;

        self.dispatch_events();
        self.controller.tick();
        self.dispatch_events();

        let notices = self.controller.take_notices();
        for notice in &notices {
            if let ControllerNotice::ReResolve {
                segment_id,
                source_id,
                attempt,
            } = notice
            {
                debug!(segment = %segment_id, source = %source_id, attempt, "servicing re-resolution");
                let result = self.sources.reresolve(source_id).await;
                if let Err(err) = self.controller.apply_resolution(segment_id, result) {
                    warn!(segment = %segment_id, %err, "re-resolution could not be applied");
                }
            }
        }
        notices
    }

    /// Play from the current position until the composition finishes, playback stops, or time runs out
    pub async fn run(&mut self, max_seconds: f64) -> SessionReport {
        let dt = self.controller.config().tick_seconds();
        let started = self.elapsed;
        let mut notices = Vec::new();
        let mut finished = false;

        self.controller.play();
        self.dispatch_events();

        while self.elapsed - started < max_seconds {
            let batch = self.step(dt).await;
            finished |= batch.contains(&ControllerNotice::Finished);
            let retrying = batch
                .iter()
                .any(|n| matches!(n, ControllerNotice::ReResolve { .. }));
            notices.extend(batch);

            if finished || (self.controller.state().is_idle() && !retrying) {
                break;
            }
        }

        let snapshot = self.controller.snapshot();
        info!(
            elapsed = self.elapsed - started,
            finished,
            time = snapshot.current_time,
            "session stopped"
        );
        SessionReport {
            elapsed: self.elapsed - started,
            finished,
            notices,
            snapshot,
        }
    }

    pub fn into_controller(self) -> PlaybackController<V, A> {
        self.controller
    }
}
