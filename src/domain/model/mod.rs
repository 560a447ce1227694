// Domain models - Segments, compositions and playback state

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Time specification in seconds, used for user-facing time arguments
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Parse `SS.ms`, `MM:SS.ms` or `HH:MM:SS.ms`
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(DomainError::BadArgs(format!(
                    "Time must be a non-negative number: {}",
                    trimmed
                )));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        let (hours, minutes, seconds_part) = match parts.as_slice() {
            [m, s] => (0, Self::parse_unit(m, "minutes")?, *s),
            [h, m, s] => (
                Self::parse_unit(h, "hours")?,
                Self::parse_unit(m, "minutes")?,
                *s,
            ),
            _ => {
                return Err(DomainError::BadArgs(format!(
                    "Invalid time format '{}'. Supported formats: 12.5, 1:02.5, 1:00:02.5",
                    trimmed
                )))
            }
        };

        if parts.len() == 3 && minutes >= 60 {
            return Err(DomainError::BadArgs("Minutes must be less than 60".to_string()));
        }
        let seconds = seconds_part
            .parse::<f64>()
            .map_err(|_| DomainError::BadArgs(format!("Invalid seconds: {}", seconds_part)))?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(DomainError::BadArgs("Seconds must be in [0, 60)".to_string()));
        }

        Ok(Self::from_seconds(
            hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
        ))
    }

    fn parse_unit(part: &str, name: &str) -> Result<u32, DomainError> {
        part.parse::<u32>()
            .map_err(|_| DomainError::BadArgs(format!("Invalid {}: {}", name, part)))
    }

    /// Format as `M:SS.mmm`, or `H:MM:SS.mmm` past the hour
    pub fn format_hms(&self) -> String {
        let total_millis = (self.seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_millis / 3_600_000;
        let minutes = (total_millis % 3_600_000) / 60_000;
        let seconds = (total_millis % 60_000) / 1000;
        let millis = total_millis % 1000;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
        } else {
            format!("{}:{:02}.{:03}", minutes, seconds, millis)
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// Stable identifier of a segment within a composition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(pub String);

impl SegmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A playable locator produced by the media resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub url: String,
    /// Natural length of the source media, when the resolver knows it
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Resolution status of a segment's source media
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SourceMedia {
    #[default]
    Unresolved,
    Resolved(ResolvedMedia),
    Failed { reason: String },
}

impl SourceMedia {
    pub fn url(&self) -> Option<&str> {
        match self {
            SourceMedia::Resolved(media) => Some(media.url.as_str()),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, SourceMedia::Resolved(_))
    }
}

/// Separately recorded narration paired with a segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceOver {
    pub audio_ref: String,
    pub natural_duration: f64,
    /// Playable URL for `audio_ref`, filled in by source resolution
    #[serde(skip)]
    pub url: Option<String>,
}

impl VoiceOver {
    pub fn new(audio_ref: impl Into<String>, natural_duration: f64) -> Self {
        Self {
            audio_ref: audio_ref.into(),
            natural_duration,
            url: None,
        }
    }
}

/// One ordered unit of the composition: a sub-range of one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub source_id: String,
    pub source_start: f64,
    pub source_end: f64,
    #[serde(default)]
    pub voice_over: Option<VoiceOver>,
    #[serde(skip)]
    pub media: SourceMedia,
}

impl Segment {
    /// Create a segment with unresolved media
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        source_start: f64,
        source_end: f64,
    ) -> Result<Self, DomainError> {
        let segment = Self {
            id: SegmentId::new(id),
            source_id: source_id.into(),
            source_start,
            source_end,
            voice_over: None,
            media: SourceMedia::Unresolved,
        };
        segment.validate()?;
        Ok(segment)
    }

    pub fn with_voice_over(mut self, voice_over: VoiceOver) -> Self {
        self.voice_over = Some(voice_over);
        self
    }

    pub fn with_media(mut self, media: SourceMedia) -> Self {
        self.media = media;
        self
    }

    /// Check `source_end > source_start` and that both bounds are usable numbers
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.source_start.is_finite() || !self.source_end.is_finite() {
            return Err(DomainError::InvalidSegment(format!(
                "{}: bounds must be finite",
                self.id
            )));
        }
        if self.source_start < 0.0 {
            return Err(DomainError::InvalidSegment(format!(
                "{}: source_start cannot be negative",
                self.id
            )));
        }
        if self.source_end <= self.source_start {
            return Err(DomainError::InvalidSegment(format!(
                "{}: source_end ({}) must be greater than source_start ({})",
                self.id, self.source_end, self.source_start
            )));
        }
        if let Some(vo) = &self.voice_over {
            if !vo.natural_duration.is_finite() || vo.natural_duration <= 0.0 {
                return Err(DomainError::InvalidSegment(format!(
                    "{}: voice-over duration must be positive",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Segments without resolved media never play
    pub fn is_playable(&self) -> bool {
        self.media.is_resolved()
    }

    /// Length of the trimmed range, regardless of resolution
    pub fn trimmed_duration(&self) -> f64 {
        self.source_end - self.source_start
    }

    /// Contribution to the global timeline; zero when degenerate
    pub fn timeline_duration(&self) -> f64 {
        if self.is_playable() {
            self.trimmed_duration()
        } else {
            0.0
        }
    }

    /// Natural length of the source file, falling back to the trimmed end
    pub fn media_duration(&self) -> f64 {
        match &self.media {
            SourceMedia::Resolved(ResolvedMedia {
                duration: Some(duration),
                ..
            }) => duration.max(self.source_end),
            _ => self.source_end,
        }
    }

    pub fn voice_over_url(&self) -> Option<&str> {
        self.voice_over.as_ref().and_then(|vo| vo.url.as_deref())
    }
}

/// Ordered, index-stable sequence of segments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    segments: Vec<Segment>,
}

impl Composition {
    /// Build a composition, rejecting structurally invalid or duplicate segments
    pub fn new(segments: Vec<Segment>) -> Result<Self, DomainError> {
        let mut seen = std::collections::HashSet::new();
        for segment in &segments {
            segment.validate()?;
            if !seen.insert(segment.id.clone()) {
                return Err(DomainError::InvalidSegment(format!(
                    "duplicate segment id {}",
                    segment.id
                )));
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn index_of(&self, id: &SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| &s.id == id)
    }

    pub fn segment(&self, id: &SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| &s.id == id)
    }

    pub fn is_playable(&self, index: usize) -> bool {
        self.segments.get(index).is_some_and(Segment::is_playable)
    }

    /// First playable index at or after `from`
    pub fn next_playable(&self, from: usize) -> Option<usize> {
        (from..self.segments.len()).find(|&i| self.segments[i].is_playable())
    }

    pub fn first_playable(&self) -> Option<usize> {
        self.next_playable(0)
    }

    /// Replace the source bounds of a single segment
    pub fn update_bounds(
        &mut self,
        id: &SegmentId,
        source_start: f64,
        source_end: f64,
    ) -> Result<(), DomainError> {
        let segment = self
            .segments
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| DomainError::UnknownSegment(id.to_string()))?;

        let mut updated = segment.clone();
        updated.source_start = source_start;
        updated.source_end = source_end;
        updated.validate()?;
        *segment = updated;
        Ok(())
    }

    /// Replace the resolution status of a segment's source media
    pub fn set_media(&mut self, id: &SegmentId, media: SourceMedia) -> Result<(), DomainError> {
        let segment = self
            .segments
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| DomainError::UnknownSegment(id.to_string()))?;
        segment.media = media;
        Ok(())
    }
}

/// Playback state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    PlayingSegment,
    WaitingForAudio,
    Transitioning,
}

impl PlaybackState {
    pub fn is_idle(&self) -> bool {
        matches!(self, PlaybackState::Idle)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::PlayingSegment => "playing",
            PlaybackState::WaitingForAudio => "waiting-for-audio",
            PlaybackState::Transitioning => "transitioning",
        };
        f.write_str(name)
    }
}

/// Snapshot published to UI consumers on every change of the global clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub current_time: f64,
    pub total_duration: f64,
    pub is_playing: bool,
    pub state: PlaybackState,
    pub active_index: Option<usize>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            total_duration: 0.0,
            is_playing: false,
            state: PlaybackState::Idle,
            active_index: None,
        }
    }
}

/// Which boundary of a segment a trim drag moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimHandle {
    Start,
    End,
}

impl TrimHandle {
    pub fn parse(handle: &str) -> Result<Self, DomainError> {
        match handle.to_lowercase().as_str() {
            "start" | "in" => Ok(TrimHandle::Start),
            "end" | "out" => Ok(TrimHandle::End),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid trim handle: {}. Valid handles: start, end",
                handle
            ))),
        }
    }
}

/// A proposed or finalized pair of source bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimEdit {
    pub start: f64,
    pub end: f64,
}

impl TrimEdit {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Tunables of the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Audio with less than this many seconds left counts as finished
    pub audio_tail_tolerance: f64,
    /// Shortest segment a trim may produce when no voice-over constrains it
    pub min_segment_duration: f64,
    /// Allowed relative deviation of a segment from its voice-over length
    pub voice_over_tolerance: f64,
    /// Upper bound on voice-over speed-up
    pub max_audio_rate: f64,
    /// Re-resolutions attempted after a media load error
    pub max_load_retries: u32,
    /// Tick interval used by host-driven sessions
    pub tick_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            audio_tail_tolerance: 0.2,
            min_segment_duration: 0.5,
            voice_over_tolerance: 0.1,
            max_audio_rate: 2.0,
            max_load_retries: 1,
            tick_interval_ms: 16,
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        let positive = [
            ("audio_tail_tolerance", self.audio_tail_tolerance),
            ("min_segment_duration", self.min_segment_duration),
            ("voice_over_tolerance", self.voice_over_tolerance),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(DomainError::ConfigError(format!(
                    "{} must be positive, got {}",
                    key, value
                )));
            }
        }
        if self.voice_over_tolerance >= 1.0 {
            return Err(DomainError::ConfigError(
                "voice_over_tolerance must be below 1.0".to_string(),
            ));
        }
        if !self.max_audio_rate.is_finite() || self.max_audio_rate < 1.0 {
            return Err(DomainError::ConfigError(format!(
                "max_audio_rate must be at least 1.0, got {}",
                self.max_audio_rate
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(DomainError::ConfigError(
                "tick_interval_ms cannot be zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_seconds(&self) -> f64 {
        self.tick_interval_ms as f64 / 1000.0
    }
}
