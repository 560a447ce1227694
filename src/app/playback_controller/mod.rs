// Playback controller - Segment sequencing state machine
//
// Owns the video and audio primitives exclusively. Every write to their
// source, position and rate goes through this module.

mod guard;

pub use guard::{TransitionGuard, TransitionReason};

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::{MediaChannel, MediaElement, MediaEvent};

/// Positions this close to the out-point count as having reached it
const BOUNDARY_EPSILON: f64 = 1e-3;

/// Notifications raised for the host, drained with [`PlaybackController::take_notices`]
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerNotice {
    /// A segment's media was loaded and positioned
    SegmentLoaded { index: usize, segment_id: SegmentId },
    /// Video reached its out-point while the voice-over is still talking
    WaitingForAudio { segment_id: SegmentId },
    /// The last segment completed; the controller rewound to the first
    Finished,
    /// The video primitive refused to start
    PlayRejected { segment_id: SegmentId, reason: String },
    /// Media failed to load; the host should re-resolve the source once
    ReResolve {
        segment_id: SegmentId,
        source_id: String,
        attempt: u32,
    },
    /// Retries exhausted; the segment is skipped from now on
    SegmentFailed { segment_id: SegmentId, reason: String },
    /// The voice-over failed; the segment continues with its own audio
    VoiceOverDropped { segment_id: SegmentId, reason: String },
}

/// State machine that plays a composition through one video and one audio primitive
pub struct PlaybackController<V, A> {
    config: PlaybackConfig,
    composition: Composition,
    timeline: TimelineMap,
    video: V,
    audio: A,
    state: PlaybackState,
    guard: TransitionGuard,
    active_index: usize,
    current_time: f64,
    /// Whether the user wants playback; survives segment switches and retries
    play_intent: bool,
    voice_over_active: bool,
    audio_rate: f64,
    /// Source position to apply once the video reports `Ready`
    pending_seek: Option<f64>,
    /// Start both primitives once the video reports `Ready`
    pending_autoplay: bool,
    load_attempts: HashMap<SegmentId, u32>,
    notices: Vec<ControllerNotice>,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
}

impl<V: MediaElement, A: MediaElement> PlaybackController<V, A> {
    /// Create a controller in `Idle`, positioned on the first playable segment
    pub fn new(video: V, audio: A, composition: Composition, config: PlaybackConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(PlaybackSnapshot::default());
        let mut controller = Self {
            config,
            composition: Composition::default(),
            timeline: TimelineMap::default(),
            video,
            audio,
            state: PlaybackState::Idle,
            guard: TransitionGuard::new(),
            active_index: 0,
            current_time: 0.0,
            play_intent: false,
            voice_over_active: false,
            audio_rate: 1.0,
            pending_seek: None,
            pending_autoplay: false,
            load_attempts: HashMap::new(),
            notices: Vec::new(),
            snapshot_tx,
        };
        controller.install_composition(composition, None);
        controller
    }

    // -- queries ---------------------------------------------------------

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        !self.state.is_idle()
    }

    /// Global clock in seconds
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn total_duration(&self) -> f64 {
        self.timeline.total_duration
    }

    /// Index of the active segment, if it is playable
    pub fn active_index(&self) -> Option<usize> {
        self.composition
            .is_playable(self.active_index)
            .then_some(self.active_index)
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn timeline(&self) -> &TimelineMap {
        &self.timeline
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn is_transition_guarded(&self) -> bool {
        self.guard.is_engaged()
    }

    /// Rate applied to the active voice-over
    pub fn audio_rate(&self) -> f64 {
        self.audio_rate
    }

    pub fn is_voice_over_active(&self) -> bool {
        self.voice_over_active
    }

    /// Stream of clock and play-state changes for UI consumers
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_time: self.current_time,
            total_duration: self.timeline.total_duration,
            is_playing: self.is_playing(),
            state: self.state,
            active_index: self.active_index(),
        }
    }

    pub fn take_notices(&mut self) -> Vec<ControllerNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn video(&self) -> &V {
        &self.video
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Access for the host's media pipeline (clock pumping, event draining)
    pub fn video_mut(&mut self) -> &mut V {
        &mut self.video
    }

    /// Access for the host's media pipeline (clock pumping, event draining)
    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    // -- commands --------------------------------------------------------

    /// Start or resume playback, re-deriving the plan from current media positions
    pub fn play(&mut self) {
        if !self.state.is_idle() {
            debug!(state = %self.state, "play ignored, already playing");
            return;
        }
        let Some(index) = self.playable_from(self.active_index) else {
            warn!("play requested but no segment has playable media");
            return;
        };
        self.play_intent = true;

        let segment = match self.composition.get(index) {
            Some(segment) => segment.clone(),
            None => return,
        };

        if index != self.active_index || self.video.source() != segment.media.url() {
            self.enter_segment(index, 0.0, true);
            return;
        }

        if !self.video.is_ready() {
            self.guard.engage(TransitionReason::EnterSegment);
            self.set_state(PlaybackState::Transitioning);
            self.pending_autoplay = true;
            self.publish();
            return;
        }

        let position = self.video.current_time();
        if self.video.is_ended() || position >= segment.source_end - BOUNDARY_EPSILON {
            // Paused at the out-point: either the voice-over still has lines or we move on
            self.guard.engage(TransitionReason::BoundaryReached);
            self.set_state(PlaybackState::Transitioning);
            if self.audio_has_remaining() {
                self.audio.request_play();
                self.enter_waiting(&segment.id);
            } else {
                self.advance_from(index);
            }
            return;
        }

        if position < segment.source_start {
            self.video.set_current_time(segment.source_start);
        }
        self.resync_audio();
        self.start_media(TransitionReason::Resume);
    }

    /// Stop both primitives immediately, including a voice-over being waited on
    pub fn pause(&mut self) {
        let previous = self.state;
        self.play_intent = false;
        self.pending_autoplay = false;
        self.video.pause();
        self.audio.pause();
        self.guard.release();
        if previous == PlaybackState::PlayingSegment {
            self.refresh_clock();
        }
        self.set_state(PlaybackState::Idle);
        self.publish();
        debug!(from = %previous, time = self.current_time, "paused");
    }

    /// Move the playhead to a global time, switching segments only when needed
    pub fn seek_to(&mut self, time: f64) {
        let Some((index, offset)) = TimelineMapper::locate(time.max(0.0), &self.timeline) else {
            warn!(time, "seek ignored, nothing playable");
            return;
        };
        let segment = match self.composition.get(index) {
            Some(segment) => segment.clone(),
            None => return,
        };

        let loaded = index == self.active_index
            && self.video.source() == segment.media.url()
            && self.video.is_ready()
            && self.pending_seek.is_none();

        if !loaded {
            debug!(time, index, offset, "seek crosses segments");
            self.enter_segment(index, offset, self.play_intent);
            return;
        }

        trace!(time, index, offset, "seek inside active segment");
        self.video.set_current_time(segment.source_start + offset);
        self.resync_audio_to(offset);
        self.current_time = self.timeline.offset(index) + offset;

        if self.state == PlaybackState::WaitingForAudio
            && offset < self.timeline.duration(index) - BOUNDARY_EPSILON
        {
            // Scrubbed back into the picture while the narration was finishing
            self.start_media(TransitionReason::Resume);
            return;
        }
        self.publish();
    }

    /// Called once per animation frame
    pub fn tick(&mut self) {
        match self.state {
            PlaybackState::PlayingSegment => {
                let Some(segment) = self.composition.get(self.active_index) else {
                    return;
                };
                let source_end = segment.source_end;
                let position = self.video.current_time();
                self.refresh_clock();

                if self.video.is_ended() || position >= source_end - BOUNDARY_EPSILON {
                    self.complete_segment();
                } else {
                    self.publish();
                }
            }
            PlaybackState::WaitingForAudio => {
                // The ended callback normally drives this; polling covers a lost event
                if self.audio.is_ended() {
                    debug!("voice-over ended (polled)");
                    self.advance_from(self.active_index);
                }
            }
            PlaybackState::Idle | PlaybackState::Transitioning => {}
        }
    }

    /// Dispatch a native media callback
    pub fn handle_event(&mut self, channel: MediaChannel, event: MediaEvent) {
        match channel {
            MediaChannel::Video => self.on_video_event(event),
            MediaChannel::Audio => self.on_audio_event(event),
        }
    }

    /// Replace the whole composition; keeps the active segment when it survives
    pub fn set_composition(&mut self, composition: Composition) {
        let keep = self
            .composition
            .get(self.active_index)
            .map(|segment| segment.id.clone());
        self.pause();
        self.install_composition(composition, keep);
        info!(
            segments = self.composition.len(),
            total = self.timeline.total_duration,
            "composition replaced"
        );
    }

    /// Optimistically apply new bounds to a segment (live trim preview)
    pub fn apply_trim(&mut self, segment_id: &SegmentId, edit: TrimEdit) -> Result<(), DomainError> {
        let active = self.active_index;
        let local = self.current_time - self.timeline.offset(active);
        self.composition.update_bounds(segment_id, edit.start, edit.end)?;
        self.recompute_timeline();

        let index = self
            .composition
            .index_of(segment_id)
            .ok_or_else(|| DomainError::UnknownSegment(segment_id.to_string()))?;

        if index == self.active_index {
            let segment = self.composition.get(index).cloned();
            if let Some(segment) = segment {
                if self.voice_over_active {
                    if let Some(vo) = &segment.voice_over {
                        self.audio_rate = RateSynchronizer::playback_rate(
                            segment.trimmed_duration(),
                            vo.natural_duration,
                            self.config.max_audio_rate,
                        );
                        self.audio.set_playback_rate(self.audio_rate);
                    }
                }

                if self.video.source() == segment.media.url() && self.video.is_ready() {
                    let position = self.video.current_time();
                    if position < segment.source_start || position > segment.source_end {
                        self.video
                            .set_current_time(position.clamp(segment.source_start, segment.source_end));
                        self.resync_audio();
                    }
                }
            }
        }

        // Trims before the active segment shift its offset
        self.current_time =
            self.timeline.offset(active) + local.clamp(0.0, self.timeline.duration(active));
        self.refresh_clock();
        self.publish();
        Ok(())
    }

    /// Outcome of a re-resolution requested through [`ControllerNotice::ReResolve`]
    pub fn apply_resolution(
        &mut self,
        segment_id: &SegmentId,
        result: Result<ResolvedMedia, DomainError>,
    ) -> Result<(), DomainError> {
        let index = self
            .composition
            .index_of(segment_id)
            .ok_or_else(|| DomainError::UnknownSegment(segment_id.to_string()))?;

        match result {
            Ok(media) => {
                let offset = (self.current_time - self.timeline.offset(index))
                    .clamp(0.0, self.timeline.duration(index));
                info!(segment = %segment_id, url = %media.url, "source re-resolved");
                self.composition
                    .set_media(segment_id, SourceMedia::Resolved(media))?;
                self.recompute_timeline();

                if index == self.active_index {
                    // Fresh locator: force a reload even if the URL string is unchanged
                    self.video.unload();
                    self.enter_segment(index, offset, self.play_intent);
                } else {
                    self.publish();
                }
            }
            Err(err) => self.mark_failed(index, err.to_string()),
        }
        Ok(())
    }

    // -- transitions -----------------------------------------------------

    /// Load, position and (optionally) start a segment
    fn enter_segment(&mut self, index: usize, offset: f64, autoplay: bool) {
        let segment = match self.composition.get(index) {
            Some(segment) if segment.is_playable() => segment.clone(),
            _ => {
                warn!(index, "refusing to enter a segment without playable media");
                return;
            }
        };
        let Some(url) = segment.media.url().map(str::to_owned) else {
            return;
        };

        self.guard.engage(TransitionReason::EnterSegment);
        self.set_state(PlaybackState::Transitioning);
        self.video.pause();
        self.audio.pause();
        self.active_index = index;
        self.pending_autoplay = false;

        if self.video.source() == Some(url.as_str()) {
            trace!(%url, "video source unchanged, skipping reload");
        } else {
            debug!(%url, "loading video source");
            self.video.load(&url);
        }

        let source_time = segment.source_start + offset;
        if self.video.is_ready() {
            self.video.set_current_time(source_time);
            self.pending_seek = None;
        } else {
            self.pending_seek = Some(source_time);
        }

        self.setup_voice_over(&segment, offset);
        self.current_time = self.timeline.offset(index) + offset;
        self.notices.push(ControllerNotice::SegmentLoaded {
            index,
            segment_id: segment.id.clone(),
        });
        info!(index, segment = %segment.id, offset, autoplay, "entered segment");

        if !autoplay {
            self.guard.release();
            self.set_state(PlaybackState::Idle);
            self.publish();
        } else if self.video.is_ready() {
            self.start_media(TransitionReason::EnterSegment);
        } else {
            self.pending_autoplay = true;
            self.publish();
        }
    }

    /// Issue play requests; the guard stays engaged until the video settles
    fn start_media(&mut self, reason: TransitionReason) {
        self.guard.engage(reason);
        self.set_state(PlaybackState::Transitioning);
        self.video.set_muted(self.voice_over_active);
        self.video.request_play();
        if self.audio_has_remaining() {
            self.audio.request_play();
        }
        self.publish();
    }

    /// Video reached its out-point: wait for the voice-over or move on
    fn complete_segment(&mut self) {
        let index = self.active_index;
        self.guard.engage(TransitionReason::BoundaryReached);
        self.set_state(PlaybackState::Transitioning);
        self.video.pause();
        self.current_time = self.timeline.offset(index) + self.timeline.duration(index);

        if self.audio_has_remaining() {
            if let Some(id) = self.composition.get(index).map(|s| s.id.clone()) {
                self.enter_waiting(&id);
            }
        } else {
            self.advance_from(index);
        }
    }

    /// Hold the paused video while the narration finishes; the guard stays engaged
    fn enter_waiting(&mut self, segment_id: &SegmentId) {
        debug!(segment = %segment_id, "waiting for voice-over to finish");
        self.set_state(PlaybackState::WaitingForAudio);
        self.notices.push(ControllerNotice::WaitingForAudio {
            segment_id: segment_id.clone(),
        });
        self.publish();
    }

    fn advance_from(&mut self, index: usize) {
        match self.composition.next_playable(index + 1) {
            Some(next) => self.enter_segment(next, 0.0, true),
            None => self.finish(),
        }
    }

    /// End of composition: stop and rewind to the first playable segment
    fn finish(&mut self) {
        info!(total = self.timeline.total_duration, "composition finished");
        self.video.pause();
        self.audio.pause();
        self.play_intent = false;
        self.notices.push(ControllerNotice::Finished);

        match self.composition.first_playable() {
            Some(first) => self.enter_segment(first, 0.0, false),
            None => {
                self.guard.release();
                self.set_state(PlaybackState::Idle);
                self.current_time = 0.0;
                self.publish();
            }
        }
    }

    fn mark_failed(&mut self, index: usize, reason: String) {
        let Some(segment_id) = self.composition.get(index).map(|s| s.id.clone()) else {
            return;
        };
        error!(segment = %segment_id, %reason, "segment media failed permanently");
        if let Err(err) = self.composition.set_media(
            &segment_id,
            SourceMedia::Failed {
                reason: reason.clone(),
            },
        ) {
            warn!(%err, "could not mark segment as failed");
        }
        self.recompute_timeline();
        self.notices
            .push(ControllerNotice::SegmentFailed { segment_id, reason });

        if index != self.active_index {
            self.publish();
            return;
        }

        if self.play_intent {
            self.advance_from(index);
        } else {
            self.guard.release();
            self.set_state(PlaybackState::Idle);
            if let Some(next) = self.playable_from(index) {
                self.active_index = next;
            }
            self.current_time = self.timeline.offset(self.active_index);
            self.publish();
        }
    }

    // -- native callbacks ------------------------------------------------

    fn on_video_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::Ready => {
                if let Some(position) = self.pending_seek.take() {
                    self.video.set_current_time(position);
                }
                if self.pending_autoplay {
                    self.pending_autoplay = false;
                    self.start_media(TransitionReason::EnterSegment);
                }
            }
            MediaEvent::PlaySettled(Ok(())) => {
                if self.pending_autoplay || self.pending_seek.is_some() {
                    trace!("stale play settlement while a load is pending");
                    return;
                }
                match self.state {
                    PlaybackState::Transitioning => {
                        self.guard.release();
                        self.set_state(PlaybackState::PlayingSegment);
                        self.publish();
                    }
                    PlaybackState::Idle => {
                        // Paused before the request settled
                        if !self.video.is_paused() {
                            self.video.pause();
                        }
                    }
                    _ => {}
                }
            }
            MediaEvent::PlaySettled(Err(reason)) => {
                if self.state != PlaybackState::Transitioning {
                    trace!(%reason, "play rejection after transition ended");
                    return;
                }
                let segment_id = self.active_segment_id();
                warn!(segment = %segment_id, %reason, "video play() rejected");
                self.guard.release();
                self.play_intent = false;
                self.pending_autoplay = false;
                self.video.pause();
                self.audio.pause();
                self.set_state(PlaybackState::Idle);
                self.notices
                    .push(ControllerNotice::PlayRejected { segment_id, reason });
                self.publish();
            }
            MediaEvent::Pause => {
                if self.guard.is_engaged() {
                    trace!("video pause ignored during transition");
                    return;
                }
                if self.state == PlaybackState::PlayingSegment {
                    if self.at_out_point() {
                        self.complete_segment();
                    } else {
                        info!("video paused externally");
                        self.pause();
                    }
                }
            }
            MediaEvent::Ended => {
                if self.guard.is_engaged() {
                    trace!("video ended ignored during transition");
                    return;
                }
                if self.state == PlaybackState::PlayingSegment {
                    self.complete_segment();
                }
            }
            MediaEvent::Seeking => {
                if self.guard.is_engaged() || self.pending_seek.is_some() {
                    return;
                }
                self.resync_audio();
                self.refresh_clock();
                self.publish();
            }
            MediaEvent::Error(reason) => self.on_video_error(reason),
        }
    }

    fn on_audio_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::Ended => {
                if self.state == PlaybackState::WaitingForAudio {
                    debug!("voice-over ended");
                    self.advance_from(self.active_index);
                }
            }
            MediaEvent::Error(reason) => self.drop_voice_over(reason),
            MediaEvent::PlaySettled(Err(reason)) => {
                if self.state.is_idle() {
                    trace!(%reason, "audio play rejection while idle");
                    return;
                }
                self.drop_voice_over(reason);
            }
            MediaEvent::Ready
            | MediaEvent::PlaySettled(Ok(()))
            | MediaEvent::Pause
            | MediaEvent::Seeking => {}
        }
    }

    fn on_video_error(&mut self, reason: String) {
        let index = self.active_index;
        let Some(segment) = self.composition.get(index).cloned() else {
            return;
        };

        self.guard.release();
        self.video.pause();
        self.audio.pause();
        self.pending_autoplay = false;
        self.pending_seek = None;

        let attempts = self.load_attempts.entry(segment.id.clone()).or_insert(0);
        if *attempts < self.config.max_load_retries {
            *attempts += 1;
            let attempt = *attempts;
            warn!(segment = %segment.id, attempt, %reason, "media load failed, requesting re-resolution");
            self.set_state(PlaybackState::Idle);
            self.notices.push(ControllerNotice::ReResolve {
                segment_id: segment.id,
                source_id: segment.source_id,
                attempt,
            });
            self.publish();
        } else {
            self.mark_failed(index, reason);
        }
    }

    fn drop_voice_over(&mut self, reason: String) {
        if !self.voice_over_active {
            return;
        }
        let segment_id = self.active_segment_id();
        warn!(segment = %segment_id, %reason, "voice-over failed, continuing with video audio");
        self.voice_over_active = false;
        self.audio_rate = 1.0;
        self.audio.pause();
        self.video.set_muted(false);
        self.notices
            .push(ControllerNotice::VoiceOverDropped { segment_id, reason });

        if self.state == PlaybackState::WaitingForAudio {
            self.advance_from(self.active_index);
        }
    }

    // -- helpers ---------------------------------------------------------

    fn install_composition(&mut self, composition: Composition, keep: Option<SegmentId>) {
        for id in VoiceOverFit::misfits(composition.segments(), &self.config) {
            warn!(segment = %id, "segment length outside its voice-over window");
        }
        self.composition = composition;
        self.load_attempts.clear();
        self.pending_seek = None;
        self.pending_autoplay = false;
        self.recompute_timeline();

        self.active_index = keep
            .and_then(|id| self.composition.index_of(&id))
            .filter(|&i| self.composition.is_playable(i))
            .or_else(|| self.composition.first_playable())
            .unwrap_or(0);
        self.current_time = self.timeline.offset(self.active_index);
        self.publish();
    }

    fn setup_voice_over(&mut self, segment: &Segment, offset: f64) {
        match (&segment.voice_over, segment.voice_over_url()) {
            (Some(vo), Some(url)) => {
                if self.audio.source() != Some(url) {
                    self.audio.load(url);
                }
                self.audio_rate = RateSynchronizer::playback_rate(
                    segment.trimmed_duration(),
                    vo.natural_duration,
                    self.config.max_audio_rate,
                );
                self.audio.set_playback_rate(self.audio_rate);
                self.audio.set_current_time(offset * self.audio_rate);
                self.voice_over_active = true;
                debug!(segment = %segment.id, rate = self.audio_rate, "voice-over armed");
            }
            _ => {
                if self.audio.source().is_some() {
                    self.audio.unload();
                }
                self.voice_over_active = false;
                self.audio_rate = 1.0;
            }
        }
        self.video.set_muted(self.voice_over_active);
    }

    fn audio_has_remaining(&self) -> bool {
        if !self.voice_over_active || self.audio.source().is_none() || self.audio.is_ended() {
            return false;
        }
        let duration = self.audio.duration().or_else(|| {
            self.composition
                .get(self.active_index)
                .and_then(|s| s.voice_over.as_ref())
                .map(|vo| vo.natural_duration)
        });
        match duration {
            Some(duration) => duration - self.audio.current_time() > self.config.audio_tail_tolerance,
            None => false,
        }
    }

    fn resync_audio(&mut self) {
        let Some(segment) = self.composition.get(self.active_index) else {
            return;
        };
        let offset = (self.video.current_time() - segment.source_start).max(0.0);
        self.resync_audio_to(offset);
    }

    /// Align the voice-over to `offset` seconds into the segment, scaled by its rate
    fn resync_audio_to(&mut self, offset: f64) {
        if !self.voice_over_active {
            return;
        }
        let target = offset * self.audio_rate;
        let duration = self.audio.duration().or_else(|| {
            self.composition
                .get(self.active_index)
                .and_then(|s| s.voice_over.as_ref())
                .map(|vo| vo.natural_duration)
        });

        match duration {
            Some(duration) if target >= duration => {
                self.audio.pause();
                self.audio.set_current_time(duration);
            }
            _ => {
                self.audio.set_current_time(target);
                if self.state == PlaybackState::PlayingSegment && self.audio.is_paused() {
                    self.audio.request_play();
                }
            }
        }
    }

    fn refresh_clock(&mut self) {
        let index = self.active_index;
        let Some(segment) = self.composition.get(index) else {
            return;
        };
        let position = if self.video.source() == segment.media.url() && self.video.is_ready() {
            self.video.current_time()
        } else if let Some(position) = self.pending_seek {
            position
        } else {
            return;
        };
        let offset = (position - segment.source_start)
            .max(0.0)
            .min(self.timeline.duration(index));
        self.current_time = self.timeline.offset(index) + offset;
    }

    fn at_out_point(&self) -> bool {
        self.video.is_ended()
            || self
                .composition
                .get(self.active_index)
                .is_some_and(|s| self.video.current_time() >= s.source_end - BOUNDARY_EPSILON)
    }

    fn playable_from(&self, index: usize) -> Option<usize> {
        self.composition
            .next_playable(index)
            .or_else(|| self.composition.first_playable())
    }

    fn active_segment_id(&self) -> SegmentId {
        self.composition
            .get(self.active_index)
            .map(|s| s.id.clone())
            .unwrap_or_else(|| SegmentId::new(""))
    }

    fn recompute_timeline(&mut self) {
        self.timeline = TimelineMapper::compute_offsets(self.composition.segments());
    }

    fn set_state(&mut self, next: PlaybackState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "playback state");
            self.state = next;
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}
