// Simulated media adapter - Deterministic media primitive driven by a virtual clock

use std::collections::HashMap;

use tracing::trace;

use crate::ports::*;

/// Reason reported when a play request is refused
pub const PLAY_REJECTED: &str = "NotAllowedError";

/// Known media and injected failures shared by simulated primitives
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    durations: HashMap<String, f64>,
    /// url -> number of loads that fail before one succeeds
    failures: HashMap<String, u32>,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_media(mut self, url: impl Into<String>, duration: f64) -> Self {
        self.insert(url, duration);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, duration: f64) {
        self.durations.insert(url.into(), duration);
    }

    /// Make the next `times` loads of `url` fail
    pub fn with_failing(mut self, url: impl Into<String>, times: u32) -> Self {
        self.failures.insert(url.into(), times);
        self
    }

    pub fn duration_of(&self, url: &str) -> Option<f64> {
        self.durations.get(url).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LoadState {
    Empty,
    Loading,
    Ready,
    Failed,
}

/// A media element whose clock only moves through [`MediaPipeline::advance`].
///
/// Loads complete at the next [`MediaPipeline::take_events`], play requests
/// settle there too, and reaching the end raises `Pause` followed by `Ended`,
/// the same order browsers use.
#[derive(Debug)]
pub struct SimulatedMedia {
    name: &'static str,
    library: MediaLibrary,
    source: Option<String>,
    load_state: LoadState,
    duration: Option<f64>,
    time: f64,
    rate: f64,
    muted: bool,
    paused: bool,
    ended: bool,
    reject_next_play: bool,
    /// Play requested while loading; settles with the load
    pending_play: bool,
    events: Vec<MediaEvent>,
    play_requests: usize,
}

impl SimulatedMedia {
    pub fn new(name: &'static str, library: MediaLibrary) -> Self {
        Self {
            name,
            library,
            source: None,
            load_state: LoadState::Empty,
            duration: None,
            time: 0.0,
            rate: 1.0,
            muted: false,
            paused: true,
            ended: false,
            reject_next_play: false,
            pending_play: false,
            events: Vec::new(),
            play_requests: 0,
        }
    }

    /// Refuse the next `request_play`, like an autoplay policy would
    pub fn reject_next_play(&mut self) {
        self.reject_next_play = true;
    }

    pub fn play_requests(&self) -> usize {
        self.play_requests
    }

    /// Raise a native pause as if the user used the element's own controls
    pub fn external_pause(&mut self) {
        self.pause();
    }

    fn push(&mut self, event: MediaEvent) {
        trace!(element = self.name, ?event, "media event");
        self.events.push(event);
    }

    fn complete_load(&mut self) {
        if self.load_state != LoadState::Loading {
            return;
        }
        let Some(url) = self.source.clone() else {
            return;
        };

        if let Some(remaining) = self.library.failures.get_mut(&url) {
            if *remaining > 0 {
                *remaining -= 1;
                self.fail_load(format!("failed to load {}", url));
                return;
            }
        }

        match self.library.duration_of(&url) {
            Some(duration) => {
                self.duration = Some(duration);
                self.load_state = LoadState::Ready;
                self.time = self.time.min(duration);
                self.push(MediaEvent::Ready);
                if self.pending_play {
                    self.pending_play = false;
                    self.push(MediaEvent::PlaySettled(Ok(())));
                }
            }
            None => self.fail_load(format!("no media at {}", url)),
        }
    }

    fn fail_load(&mut self, reason: String) {
        self.load_state = LoadState::Failed;
        self.paused = true;
        self.push(MediaEvent::Error(reason.clone()));
        if self.pending_play {
            self.pending_play = false;
            self.push(MediaEvent::PlaySettled(Err(reason)));
        }
    }
}

impl MediaElement for SimulatedMedia {
    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn load(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.load_state = LoadState::Loading;
        self.duration = None;
        self.time = 0.0;
        self.paused = true;
        self.ended = false;
        self.pending_play = false;
    }

    fn unload(&mut self) {
        self.source = None;
        self.load_state = LoadState::Empty;
        self.duration = None;
        self.time = 0.0;
        self.paused = true;
        self.ended = false;
        self.pending_play = false;
    }

    fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let limit = self.duration.unwrap_or(f64::MAX);
        self.time = seconds.max(0.0).min(limit);
        self.ended = false;
        if self.load_state == LoadState::Ready {
            self.push(MediaEvent::Seeking);
        }
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_ended(&self) -> bool {
        self.ended
    }

    fn request_play(&mut self) {
        self.play_requests += 1;
        if self.reject_next_play {
            self.reject_next_play = false;
            self.push(MediaEvent::PlaySettled(Err(PLAY_REJECTED.to_string())));
            return;
        }
        match self.load_state {
            LoadState::Loading => {
                self.paused = false;
                self.pending_play = true;
                return;
            }
            LoadState::Empty | LoadState::Failed => {
                self.push(MediaEvent::PlaySettled(Err("no playable source".to_string())));
                return;
            }
            LoadState::Ready => {}
        }
        if self.ended {
            self.time = 0.0;
            self.ended = false;
        }
        self.paused = false;
        self.push(MediaEvent::PlaySettled(Ok(())));
    }

    fn pause(&mut self) {
        self.pending_play = false;
        if !self.paused {
            self.paused = true;
            self.push(MediaEvent::Pause);
        }
    }
}

impl MediaPipeline for SimulatedMedia {
    fn advance(&mut self, dt: f64) {
        if self.paused || self.load_state != LoadState::Ready {
            return;
        }
        let Some(duration) = self.duration else {
            return;
        };
        self.time += dt * self.rate;
        if self.time >= duration {
            self.time = duration;
            self.paused = true;
            self.ended = true;
            self.push(MediaEvent::Pause);
            self.push(MediaEvent::Ended);
        }
    }

    fn take_events(&mut self) -> Vec<MediaEvent> {
        self.complete_load();
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> MediaLibrary {
        MediaLibrary::new().with_media("https://cdn/a.mp4", 4.0)
    }

    #[test]
    fn test_load_completes_on_next_drain() {
        let mut media = SimulatedMedia::new("video", library());
        media.load("https://cdn/a.mp4");
        assert!(!media.is_ready());

        assert_eq!(media.take_events(), vec![MediaEvent::Ready]);
        assert!(media.is_ready());
        assert_eq!(media.duration(), Some(4.0));
    }

    #[test]
    fn test_playing_to_the_end_raises_pause_then_ended() {
        let mut media = SimulatedMedia::new("video", library());
        media.load("https://cdn/a.mp4");
        media.take_events();
        media.request_play();
        assert_eq!(media.take_events(), vec![MediaEvent::PlaySettled(Ok(()))]);

        media.set_playback_rate(2.0);
        media.advance(1.0);
        assert_eq!(media.current_time(), 2.0);
        media.advance(1.5);

        assert!(media.is_ended());
        assert_eq!(media.current_time(), 4.0);
        assert_eq!(media.take_events(), vec![MediaEvent::Pause, MediaEvent::Ended]);
    }

    #[test]
    fn test_injected_failures() {
        let library = library().with_failing("https://cdn/a.mp4", 1);
        let mut media = SimulatedMedia::new("video", library);

        media.load("https://cdn/a.mp4");
        assert!(matches!(media.take_events().as_slice(), [MediaEvent::Error(_)]));

        media.load("https://cdn/a.mp4");
        assert_eq!(media.take_events(), vec![MediaEvent::Ready]);

        media.load("https://cdn/missing.mp4");
        assert!(matches!(media.take_events().as_slice(), [MediaEvent::Error(_)]));
    }

    #[test]
    fn test_rejected_play_stays_paused() {
        let mut media = SimulatedMedia::new("video", library());
        media.load("https://cdn/a.mp4");
        media.take_events();
        media.reject_next_play();
        media.request_play();

        assert!(media.is_paused());
        assert_eq!(
            media.take_events(),
            vec![MediaEvent::PlaySettled(Err(PLAY_REJECTED.to_string()))]
        );
    }
}
