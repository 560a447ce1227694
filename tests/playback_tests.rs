use std::collections::BTreeMap;
use std::sync::Arc;

use sceneplay::adapters::{ManifestResolver, MediaLibrary, SimulatedMedia};
use sceneplay::app::container::DefaultAppContainer;
use sceneplay::domain::model::ResolvedMedia;
use sceneplay::*;

type SimSession = PlaybackSession<SimulatedMedia, SimulatedMedia>;

/// Test utilities for simulated playback
mod test_utils {
    use super::*;

    pub const DT: f64 = 0.01;

    pub fn config() -> PlaybackConfig {
        PlaybackConfig {
            tick_interval_ms: 10,
            ..PlaybackConfig::default()
        }
    }

    pub fn manifest(entries: &[(&str, f64)]) -> BTreeMap<String, ResolvedMedia> {
        entries
            .iter()
            .map(|(key, duration)| {
                (
                    key.to_string(),
                    ResolvedMedia {
                        url: format!("https://media.test/{}", key),
                        duration: Some(*duration),
                    },
                )
            })
            .collect()
    }

    pub fn url(key: &str) -> String {
        format!("https://media.test/{}", key)
    }

    pub async fn session_with(
        segments: Vec<Segment>,
        entries: &[(&str, f64)],
        tweak: impl FnOnce(MediaLibrary) -> MediaLibrary,
    ) -> SimSession {
        let media = manifest(entries);
        let library = tweak(DefaultAppContainer::media_library(&segments, &media));
        let sources = Arc::new(SourceInteractor::new(Arc::new(ManifestResolver::new(media))));
        let composition = sources.resolve_composition(segments).await.unwrap();

        let controller = PlaybackController::new(
            SimulatedMedia::new("video", library.clone()),
            SimulatedMedia::new("audio", library),
            composition,
            config(),
        );
        PlaybackSession::new(controller, sources)
    }

    pub async fn session(segments: Vec<Segment>, entries: &[(&str, f64)]) -> SimSession {
        session_with(segments, entries, |library| library).await
    }

    pub fn segment(id: &str, source: &str, start: f64, end: f64) -> Segment {
        Segment::new(id, source, start, end).unwrap()
    }

    pub fn narrated(id: &str, source: &str, start: f64, end: f64, vo: &str, natural: f64) -> Segment {
        segment(id, source, start, end).with_voice_over(VoiceOver::new(vo, natural))
    }

    /// Step until `done` holds, collecting notices; panics after `max_steps`
    pub async fn step_until(
        session: &mut SimSession,
        max_steps: usize,
        done: impl Fn(&SimSession) -> bool,
    ) -> Vec<ControllerNotice> {
        let mut notices = Vec::new();
        for _ in 0..max_steps {
            notices.extend(session.step(DT).await);
            if done(session) {
                return notices;
            }
        }
        panic!("condition not reached after {} steps", max_steps);
    }

    pub fn loaded_indices(notices: &[ControllerNotice]) -> Vec<usize> {
        notices
            .iter()
            .filter_map(|n| match n {
                ControllerNotice::SegmentLoaded { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }
}

use test_utils::*;

#[tokio::test]
async fn test_plays_composition_to_the_end_and_rewinds() {
    let mut session = session(
        vec![
            segment("a", "clip-a", 0.0, 2.0),
            segment("b", "clip-b", 0.0, 1.0),
        ],
        &[("clip-a", 10.0), ("clip-b", 10.0)],
    )
    .await;

    let report = session.run(30.0).await;

    assert!(report.finished);
    assert!(report.elapsed > 2.9 && report.elapsed < 3.5, "elapsed {}", report.elapsed);
    assert_eq!(
        &report.notices[..3],
        &[
            ControllerNotice::SegmentLoaded {
                index: 0,
                segment_id: SegmentId::new("a")
            },
            ControllerNotice::SegmentLoaded {
                index: 1,
                segment_id: SegmentId::new("b")
            },
            ControllerNotice::Finished,
        ]
    );

    let controller = session.controller();
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(controller.current_time(), 0.0);
    assert_eq!(controller.active_index(), Some(0));
    assert!(!report.snapshot.is_playing);
}

#[tokio::test]
async fn test_seek_maps_global_time_into_second_segment() {
    let mut session = session(
        vec![
            segment("a", "clip-a", 0.0, 5.0),
            segment("b", "clip-b", 2.0, 5.0),
        ],
        &[("clip-a", 10.0), ("clip-b", 10.0)],
    )
    .await;
    assert_eq!(session.controller().total_duration(), 8.0);

    session.controller_mut().seek_to(6.0);
    session.dispatch_events();

    let controller = session.controller();
    assert_eq!(controller.active_index(), Some(1));
    assert_eq!(controller.video().source(), Some(url("clip-b").as_str()));
    assert!((controller.video().current_time() - 3.0).abs() < 1e-9);
    assert!((controller.current_time() - 6.0).abs() < 1e-9);
    assert!(!controller.is_playing());
}

#[tokio::test]
async fn test_long_voice_over_is_capped_at_max_rate() {
    let mut session = session(
        vec![narrated("a", "clip-a", 0.0, 3.0, "vo-a", 6.0)],
        &[("clip-a", 10.0), ("vo-a", 6.0)],
    )
    .await;

    session.controller_mut().play();
    step_until(&mut session, 50, |s| {
        s.controller().state() == PlaybackState::PlayingSegment
    })
    .await;

    let controller = session.controller();
    assert_eq!(controller.audio_rate(), 2.0);
    assert_eq!(controller.audio().playback_rate(), 2.0);
    assert!(controller.video().is_muted());

    let report = session.run(30.0).await;
    assert!(report.finished);
    assert!(!report
        .notices
        .iter()
        .any(|n| matches!(n, ControllerNotice::WaitingForAudio { .. })));
}

#[tokio::test]
async fn test_waits_for_voice_over_before_advancing() {
    let mut session = session(
        vec![
            narrated("a", "clip-a", 0.0, 1.0, "vo-a", 3.0),
            segment("b", "clip-b", 0.0, 1.0),
        ],
        &[("clip-a", 10.0), ("clip-b", 10.0), ("vo-a", 3.0)],
    )
    .await;

    let report = session.run(30.0).await;
    assert!(report.finished);

    let waiting = report
        .notices
        .iter()
        .position(|n| {
            *n == ControllerNotice::WaitingForAudio {
                segment_id: SegmentId::new("a"),
            }
        })
        .expect("waiting notice");
    let entered_b = report
        .notices
        .iter()
        .position(|n| {
            *n == ControllerNotice::SegmentLoaded {
                index: 1,
                segment_id: SegmentId::new("b"),
            }
        })
        .expect("segment b entered");
    assert!(waiting < entered_b);

    // 1s of video, 0.5s holding for narration at 2x, 1s of b
    assert!(report.elapsed > 2.4 && report.elapsed < 2.8, "elapsed {}", report.elapsed);
}

#[tokio::test]
async fn test_pause_while_waiting_stops_narration_and_play_resumes_it() {
    let mut session = session(
        vec![
            narrated("a", "clip-a", 0.0, 1.0, "vo-a", 3.0),
            segment("b", "clip-b", 0.0, 1.0),
        ],
        &[("clip-a", 10.0), ("clip-b", 10.0), ("vo-a", 3.0)],
    )
    .await;

    session.controller_mut().play();
    step_until(&mut session, 300, |s| {
        s.controller().state() == PlaybackState::WaitingForAudio
    })
    .await;

    session.controller_mut().pause();
    let frozen = session.controller().audio().current_time();
    for _ in 0..20 {
        session.step(DT).await;
    }
    let controller = session.controller();
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert!(controller.audio().is_paused());
    assert_eq!(controller.audio().current_time(), frozen);
    assert_eq!(controller.active_index(), Some(0));

    session.controller_mut().play();
    assert_eq!(session.controller().state(), PlaybackState::WaitingForAudio);

    let notices = step_until(&mut session, 300, |s| s.controller().active_index() == Some(1)).await;
    assert!(loaded_indices(&notices).contains(&1));
}

#[tokio::test]
async fn test_controller_pause_during_transition_is_ignored() {
    // Both segments share one source, so the switch is a seek plus play
    let mut session = session(
        vec![
            segment("a", "clip-a", 0.0, 2.0),
            segment("b", "clip-a", 5.0, 6.0),
        ],
        &[("clip-a", 10.0)],
    )
    .await;

    session.controller_mut().play();
    step_until(&mut session, 400, |s| s.controller().active_index() == Some(1)).await;
    session.step(DT).await;

    let controller = session.controller();
    assert_eq!(controller.state(), PlaybackState::PlayingSegment);
    assert!(!controller.is_transition_guarded());
    assert!(controller.video().current_time() >= 5.0);
    assert_eq!(controller.video().play_requests(), 2);

    let report = session.run(30.0).await;
    assert!(report.finished);
}

#[tokio::test]
async fn test_external_pause_stops_playback() {
    let mut session = session(
        vec![segment("a", "clip-a", 0.0, 4.0)],
        &[("clip-a", 10.0)],
    )
    .await;

    session.controller_mut().play();
    step_until(&mut session, 100, |s| s.controller().current_time() > 1.0).await;

    session.controller_mut().video_mut().external_pause();
    session.step(DT).await;

    let controller = session.controller();
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert!(controller.current_time() > 1.0 && controller.current_time() < 1.1);
}

#[tokio::test]
async fn test_unresolvable_segment_is_skipped() {
    let mut session = session(
        vec![
            segment("a", "clip-a", 0.0, 2.0),
            segment("b", "clip-missing", 0.0, 3.0),
            segment("c", "clip-c", 0.0, 1.0),
        ],
        &[("clip-a", 10.0), ("clip-c", 10.0)],
    )
    .await;

    assert_eq!(session.controller().total_duration(), 3.0);

    session.controller_mut().seek_to(2.0);
    assert_eq!(session.controller().active_index(), Some(2));
    session.controller_mut().seek_to(0.0);
    session.dispatch_events();

    let report = session.run(30.0).await;
    assert!(report.finished);
    let loaded = loaded_indices(&report.notices);
    assert!(!loaded.contains(&1));
    assert!(loaded.contains(&2));
}

#[tokio::test]
async fn test_load_error_is_retried_once_then_plays() {
    let mut session = session_with(
        vec![segment("a", "clip-a", 0.0, 1.0)],
        &[("clip-a", 10.0)],
        |library| library.with_failing(url("clip-a"), 1),
    )
    .await;

    let report = session.run(30.0).await;

    assert!(report.finished);
    assert!(report.notices.contains(&ControllerNotice::ReResolve {
        segment_id: SegmentId::new("a"),
        source_id: "clip-a".to_string(),
        attempt: 1,
    }));
    assert!(!report
        .notices
        .iter()
        .any(|n| matches!(n, ControllerNotice::SegmentFailed { .. })));
}

#[tokio::test]
async fn test_persistent_load_error_marks_segment_failed() {
    let mut session = session_with(
        vec![
            segment("a", "clip-a", 0.0, 2.0),
            segment("b", "clip-b", 0.0, 1.0),
        ],
        &[("clip-a", 10.0), ("clip-b", 10.0)],
        |library| library.with_failing(url("clip-a"), 10),
    )
    .await;

    let report = session.run(30.0).await;

    assert!(report.finished);
    let failed = report
        .notices
        .iter()
        .position(|n| matches!(n, ControllerNotice::SegmentFailed { segment_id, .. } if segment_id.as_str() == "a"))
        .expect("segment a failed");
    let retried = report
        .notices
        .iter()
        .position(|n| matches!(n, ControllerNotice::ReResolve { .. }))
        .expect("one retry");
    assert!(retried < failed);

    let controller = session.controller();
    assert_eq!(controller.total_duration(), 1.0);
    assert_eq!(controller.active_index(), Some(1));
}

#[tokio::test]
async fn test_rejected_play_stops_without_retry() {
    let mut session = session(
        vec![segment("a", "clip-a", 0.0, 2.0)],
        &[("clip-a", 10.0)],
    )
    .await;
    session.controller_mut().video_mut().reject_next_play();

    let report = session.run(30.0).await;

    assert!(!report.finished);
    assert!(report.notices.iter().any(|n| matches!(
        n,
        ControllerNotice::PlayRejected { reason, .. } if reason == "NotAllowedError"
    )));
    assert_eq!(session.controller().state(), PlaybackState::Idle);
    assert_eq!(session.controller().video().play_requests(), 1);
}

#[tokio::test]
async fn test_snapshot_stream_follows_the_clock() {
    let mut session = session(
        vec![segment("a", "clip-a", 0.0, 2.0)],
        &[("clip-a", 10.0)],
    )
    .await;
    let mut rx = session.controller().subscribe();

    session.controller_mut().play();
    step_until(&mut session, 100, |s| s.controller().current_time() > 0.5).await;

    assert!(rx.has_changed().unwrap());
    let snapshot = *rx.borrow_and_update();
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.total_duration, 2.0);
    assert!(snapshot.current_time > 0.5);
    assert_eq!(snapshot.active_index, Some(0));
}

#[tokio::test]
async fn test_replacing_composition_keeps_active_segment() {
    let mut session = session(
        vec![
            segment("a", "clip-a", 0.0, 2.0),
            segment("b", "clip-b", 0.0, 1.0),
        ],
        &[("clip-a", 10.0), ("clip-b", 10.0)],
    )
    .await;
    session.controller_mut().seek_to(2.5);
    assert_eq!(session.controller().active_index(), Some(1));

    let replacement = session
        .controller()
        .composition()
        .segments()
        .iter()
        .rev()
        .cloned()
        .collect();
    session
        .controller_mut()
        .set_composition(Composition::new(replacement).unwrap());

    let controller = session.controller();
    assert_eq!(controller.active_index(), Some(0));
    assert_eq!(controller.composition().get(0).unwrap().id, SegmentId::new("b"));
    assert_eq!(controller.current_time(), 0.0);
    assert_eq!(controller.state(), PlaybackState::Idle);
}
