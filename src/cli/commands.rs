//! Command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::app::container::DefaultAppContainer;
use crate::app::ControllerNotice;
use crate::cli::args::{InspectArgs, PlayArgs, TrimArgs};
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::error::SceneplayError;

/// One row of the timeline report
#[derive(Debug, Serialize)]
pub struct SegmentReport {
    pub index: usize,
    pub id: String,
    pub source_id: String,
    pub source_start: f64,
    pub source_end: f64,
    pub offset: f64,
    pub duration: f64,
    pub playable: bool,
    /// Voice-over playback rate, when the segment is narrated
    pub voice_over_rate: Option<f64>,
    pub min_duration: f64,
    pub max_duration: f64,
}

/// Global timeline of a composition
#[derive(Debug, Serialize)]
pub struct TimelineReport {
    pub total_duration: f64,
    pub segments: Vec<SegmentReport>,
}

impl TimelineReport {
    pub fn build(composition: &Composition, config: &PlaybackConfig) -> Self {
        let map = TimelineMapper::compute_offsets(composition.segments());
        let segments = composition
            .segments()
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let natural = segment.voice_over.as_ref().map(|vo| vo.natural_duration);
                let bounds = TrimConstraintSolver::duration_bounds(
                    natural,
                    segment.media_duration(),
                    config,
                );
                SegmentReport {
                    index,
                    id: segment.id.to_string(),
                    source_id: segment.source_id.clone(),
                    source_start: segment.source_start,
                    source_end: segment.source_end,
                    offset: map.offset(index),
                    duration: map.duration(index),
                    playable: segment.is_playable(),
                    voice_over_rate: natural.map(|vo| {
                        RateSynchronizer::playback_rate(
                            segment.trimmed_duration(),
                            vo,
                            config.max_audio_rate,
                        )
                    }),
                    min_duration: bounds.min,
                    max_duration: bounds.max,
                }
            })
            .collect();

        Self {
            total_duration: map.total_duration,
            segments,
        }
    }
}

/// Execute the inspect command
pub async fn inspect(args: InspectArgs, config: PlaybackConfig) -> Result<()> {
    let container = DefaultAppContainer::new(&args.scenes, None, config.clone())?;
    let composition = container
        .load_composition()
        .await
        .context("Failed to load composition")?;
    let report = TimelineReport::build(&composition, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Timeline: {} segments, total {}",
        report.segments.len(),
        TimeSpec::from_seconds(report.total_duration)
    );
    println!(
        "{:>3}  {:<16} {:>10} {:>10}  {:<19} {:>7}",
        "#", "segment", "offset", "duration", "trim window", "vo rate"
    );
    for row in &report.segments {
        let rate = row
            .voice_over_rate
            .map(|r| format!("{:.2}x", r))
            .unwrap_or_else(|| "-".to_string());
        let window = format!("[{:.3}, {:.3}]", row.min_duration, row.max_duration);
        let status = if row.playable { "" } else { "  (skipped)" };
        println!(
            "{:>3}  {:<16} {:>10} {:>10}  {:<19} {:>7}{}",
            row.index,
            row.id,
            TimeSpec::from_seconds(row.offset).to_string(),
            TimeSpec::from_seconds(row.duration).to_string(),
            window,
            rate,
            status
        );
    }
    Ok(())
}

/// Execute the play command
pub async fn play(args: PlayArgs, config: PlaybackConfig) -> Result<()> {
    let container = DefaultAppContainer::new(&args.scenes, None, config)?;
    let composition = container
        .load_composition()
        .await
        .context("Failed to load composition")?;
    if composition.first_playable().is_none() {
        return Err(SceneplayError::NothingPlayable.into());
    }

    let mut session = container.simulated_session(composition);
    info!(
        total = session.controller().total_duration(),
        "starting simulated playback"
    );

    if let Some(seek) = &args.seek {
        let target = TimeSpec::parse(seek).context("Invalid --seek")?;
        session.controller_mut().seek_to(target.seconds);
        session.dispatch_events();
    }

    let report = session.run(args.max_seconds).await;
    for notice in &report.notices {
        println!("{}", describe_notice(notice, session.controller().composition()));
        // The rewind that follows the end is not part of the run
        if *notice == ControllerNotice::Finished {
            break;
        }
    }

    let snapshot = report.snapshot;
    if report.finished {
        println!(
            "Finished after {} of playback",
            TimeSpec::from_seconds(report.elapsed)
        );
    } else {
        warn!(state = %snapshot.state, "playback stopped before the end");
        println!(
            "Stopped at {} / {} ({})",
            TimeSpec::from_seconds(snapshot.current_time),
            TimeSpec::from_seconds(snapshot.total_duration),
            snapshot.state
        );
    }
    Ok(())
}

/// Execute the trim command
pub async fn trim(args: TrimArgs, config: PlaybackConfig) -> Result<()> {
    let handle = TrimHandle::parse(&args.handle)?;
    let proposed = TimeSpec::parse(&args.to).context("Invalid --to")?.seconds;

    let container = DefaultAppContainer::new(&args.scenes, args.store.clone(), config)?;
    let composition = container
        .load_composition()
        .await
        .context("Failed to load composition")?;
    let mut controller = container.simulated_controller(composition);
    let mut trims = container.trim_interactor();

    let segment_id = SegmentId::new(args.segment);
    let before = trims.begin(&segment_id, handle, controller.composition())?;
    trims.update(proposed, &mut controller)?;
    let edit = trims.finish().await?;

    println!(
        "{}: {:.3}-{:.3} -> {:.3}-{:.3}",
        segment_id, before.start, before.end, edit.start, edit.end
    );
    let moved = match handle {
        TrimHandle::Start => edit.start,
        TrimHandle::End => edit.end,
    };
    if (moved - proposed).abs() > 1e-9 {
        println!("Requested {:.3}, clamped to {:.3}", proposed, moved);
    }
    println!(
        "Timeline total: {}",
        TimeSpec::from_seconds(controller.total_duration())
    );
    Ok(())
}

fn describe_notice(notice: &ControllerNotice, composition: &Composition) -> String {
    match notice {
        ControllerNotice::SegmentLoaded { index, segment_id } => {
            let source = composition
                .segment(segment_id)
                .map(|s| s.source_id.as_str())
                .unwrap_or("?");
            format!("segment {} [{}] from {}", index, segment_id, source)
        }
        ControllerNotice::WaitingForAudio { segment_id } => {
            format!("segment {} waiting for voice-over", segment_id)
        }
        ControllerNotice::Finished => "composition finished".to_string(),
        ControllerNotice::PlayRejected { segment_id, reason } => {
            format!("play rejected on {}: {}", segment_id, reason)
        }
        ControllerNotice::ReResolve {
            segment_id,
            attempt,
            ..
        } => format!("re-resolving {} (attempt {})", segment_id, attempt),
        ControllerNotice::SegmentFailed { segment_id, reason } => {
            format!("segment {} skipped: {}", segment_id, reason)
        }
        ControllerNotice::VoiceOverDropped { segment_id, reason } => {
            format!("voice-over dropped on {}: {}", segment_id, reason)
        }
    }
}
