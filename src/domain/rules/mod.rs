// Domain rules - Timeline math, trim constraints and voice-over rate policy

use crate::domain::model::*;

/// Offsets of every segment on the global timeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineMap {
    pub start_offsets: Vec<f64>,
    pub durations: Vec<f64>,
    pub total_duration: f64,
}

impl TimelineMap {
    pub fn len(&self) -> usize {
        self.start_offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_offsets.is_empty()
    }

    pub fn is_degenerate(&self, index: usize) -> bool {
        self.durations.get(index).map_or(true, |&d| d <= 0.0)
    }

    pub fn offset(&self, index: usize) -> f64 {
        self.start_offsets.get(index).copied().unwrap_or(0.0)
    }

    pub fn duration(&self, index: usize) -> f64 {
        self.durations.get(index).copied().unwrap_or(0.0)
    }
}

/// Maps the ordered segment list onto one global timeline
pub struct TimelineMapper;

impl TimelineMapper {
    /// Prefix sums of segment durations; degenerate segments get a zero-width entry
    pub fn compute_offsets(segments: &[Segment]) -> TimelineMap {
        let mut start_offsets = Vec::with_capacity(segments.len());
        let mut durations = Vec::with_capacity(segments.len());
        let mut cursor = 0.0;

        for segment in segments {
            let duration = segment.timeline_duration();
            start_offsets.push(cursor);
            durations.push(duration);
            cursor += duration;
        }

        TimelineMap {
            start_offsets,
            durations,
            total_duration: cursor,
        }
    }

    /// Last non-degenerate segment whose offset is at or before `time`.
    ///
    /// Times past the end clamp to the last non-degenerate segment, times
    /// before zero to the first. Returns `None` when nothing is playable.
    pub fn resolve_global_time(time: f64, map: &TimelineMap) -> Option<usize> {
        let time = if time.is_nan() { 0.0 } else { time };

        if time >= map.total_duration {
            return (0..map.len()).rev().find(|&i| !map.is_degenerate(i));
        }

        let upper = map.start_offsets.partition_point(|&offset| offset <= time);
        (0..upper)
            .rev()
            .find(|&i| !map.is_degenerate(i))
            .or_else(|| (0..map.len()).find(|&i| !map.is_degenerate(i)))
    }

    /// Segment index plus the offset inside that segment, clamped to its width
    pub fn locate(time: f64, map: &TimelineMap) -> Option<(usize, f64)> {
        let index = Self::resolve_global_time(time, map)?;
        let offset = (time - map.offset(index)).clamp(0.0, map.duration(index));
        Some((index, offset))
    }
}

/// Legal duration window for one segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationBounds {
    pub min: f64,
    pub max: f64,
}

/// Clamps boundary drags so a segment stays inside its media and voice-over window
pub struct TrimConstraintSolver;

impl TrimConstraintSolver {
    /// `[0.9, 1.1] x voice_over` when narrated, `[min_segment_duration, media]` otherwise
    pub fn duration_bounds(
        voice_over_duration: Option<f64>,
        media_duration: f64,
        config: &PlaybackConfig,
    ) -> DurationBounds {
        let media_duration = media_duration.max(0.0);
        let (min, max) = match voice_over_duration.filter(|d| d.is_finite() && *d > 0.0) {
            Some(vo) => (
                vo * (1.0 - config.voice_over_tolerance),
                vo * (1.0 + config.voice_over_tolerance),
            ),
            None => (config.min_segment_duration, media_duration),
        };

        // Media shorter than the window: the media length wins
        let min = min.min(media_duration);
        let max = max.min(media_duration).max(min);
        DurationBounds { min, max }
    }

    /// Clamp a proposed boundary position. Never fails; out-of-range input is pulled in.
    pub fn clamp(
        handle: TrimHandle,
        proposed: f64,
        current: TrimEdit,
        media_duration: f64,
        voice_over_duration: Option<f64>,
        config: &PlaybackConfig,
    ) -> TrimEdit {
        let media_duration = media_duration.max(0.0);
        let bounds = Self::duration_bounds(voice_over_duration, media_duration, config);

        match handle {
            TrimHandle::Start => {
                let end = bounded(finite_or(current.end, media_duration), bounds.min, media_duration);
                let mut start = bounded(finite_or(proposed, current.start), 0.0, end - bounds.min);
                if end - start > bounds.max {
                    start = end - bounds.max;
                }
                TrimEdit::new(start, end)
            }
            TrimHandle::End => {
                let start = bounded(finite_or(current.start, 0.0), 0.0, media_duration - bounds.min);
                let mut end = bounded(
                    finite_or(proposed, current.end),
                    start + bounds.min,
                    media_duration,
                );
                if end - start > bounds.max {
                    end = start + bounds.max;
                }
                TrimEdit::new(start, end)
            }
        }
    }
}

/// Clamp where the lower bound wins if rounding leaves `lo` above `hi`
fn bounded(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else if fallback.is_finite() {
        fallback
    } else {
        0.0
    }
}

/// Speed-up applied to a voice-over so it fits its video segment
pub struct RateSynchronizer;

impl RateSynchronizer {
    /// Never below 1.0: a short voice-over is padded with silence, not slowed down
    pub fn playback_rate(video_duration: f64, voice_over_duration: f64, max_rate: f64) -> f64 {
        let max_rate = max_rate.max(1.0);
        if !voice_over_duration.is_finite() || voice_over_duration <= video_duration {
            return 1.0;
        }
        if video_duration <= 0.0 {
            return max_rate;
        }
        (voice_over_duration / video_duration).clamp(1.0, max_rate)
    }
}

/// Whether a segment's length sits inside its voice-over tolerance window
pub struct VoiceOverFit;

impl VoiceOverFit {
    pub fn fits(segment: &Segment, config: &PlaybackConfig) -> bool {
        match &segment.voice_over {
            Some(vo) => {
                let duration = segment.trimmed_duration();
                let slack = 1e-9;
                duration >= vo.natural_duration * (1.0 - config.voice_over_tolerance) - slack
                    && duration <= vo.natural_duration * (1.0 + config.voice_over_tolerance) + slack
            }
            None => true,
        }
    }

    /// Ids of narrated segments whose trimmed length falls outside the window
    pub fn misfits<'a>(segments: &'a [Segment], config: &PlaybackConfig) -> Vec<&'a SegmentId> {
        segments
            .iter()
            .filter(|s| !Self::fits(s, config))
            .map(|s| &s.id)
            .collect()
    }
}
