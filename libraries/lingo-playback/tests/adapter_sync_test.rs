//! Controller, command planning and progress poller wired together
//!
//! Drives the same per-frame loop a UI would run against a recording player.


use lingo_playback::{
    AdapterCommand, AdapterSync, ExternalState, PlaybackConfig, PlaybackError, PollerState,
    ProgressPoller, SessionController,
};
use std::time::{Duration, Instant};
use test_helpers::{create_test_tracks, init_tracing, PlayerCall, RecordingPlayer};

struct Harness {
    session: SessionController,
    sync: AdapterSync,
    poller: ProgressPoller,
    player: RecordingPlayer,
    start: Instant,
}

impl Harness {
    fn new() -> Self {
        init_tracing();
        let config = PlaybackConfig::default();
        Self {
            poller: ProgressPoller::new(config.poll_interval()),
            session: SessionController::new(config),
            sync: AdapterSync::new(),
            player: RecordingPlayer::new(),
            start: Instant::now(),
        }
    }

    fn at(&self, seconds: u64) -> Instant {
        self.start + Duration::from_secs(seconds)
    }

    /// One UI frame: push commands to the player, re-arm the poller, poll
    fn frame(&mut self, now: Instant) -> Vec<PlayerCall> {
        let snapshot = self.session.snapshot().clone();
        self.sync.apply(&snapshot, &mut self.player).unwrap();
        self.poller.sync(&snapshot, now);
        self.poller.tick(now, &mut self.session, &self.player);
        self.player.take_calls()
    }
}

fn load(id: &str) -> PlayerCall {
    PlayerCall::Load(format!("{id:0>11}"))
}

#[test]
fn start_loads_plays_and_polls() {
    let mut h = Harness::new();
    h.session
        .start_queue(create_test_tracks(&["1", "2", "3"]), 0, "pl1")
        .unwrap();

    assert_eq!(h.frame(h.at(0)), vec![load("1"), PlayerCall::Play]);
    assert_eq!(h.poller.state(), PollerState::Active);

    h.session.report_external_state(ExternalState::Playing);
    h.player.time = Some(30.0);
    h.player.duration = Some(200.0);

    assert!(h.frame(h.at(1)).is_empty());
    assert_eq!(h.session.position_seconds(), 30.0);
    assert_eq!(h.session.duration_seconds(), 200.0);
}

#[test]
fn ended_moves_player_to_next_track() {
    let mut h = Harness::new();
    h.session
        .start_queue(create_test_tracks(&["1", "2"]), 0, "pl1")
        .unwrap();
    h.frame(h.at(0));

    h.session.report_external_state(ExternalState::Ended);
    assert_eq!(h.frame(h.at(1)), vec![load("2"), PlayerCall::Play]);
    assert_eq!(h.poller.generation(), 2);

    h.session.report_external_state(ExternalState::Ended);
    assert_eq!(h.frame(h.at(2)), vec![PlayerCall::Pause]);
    assert_eq!(h.poller.state(), PollerState::Idle);
}

#[test]
fn loop_restart_seeks_instead_of_reloading() {
    let mut h = Harness::new();
    h.session
        .start_queue(create_test_tracks(&["1", "2"]), 0, "pl1")
        .unwrap();
    h.session.set_looping(true);
    h.frame(h.at(0));

    h.player.time = Some(179.0);
    h.frame(h.at(1));
    assert_eq!(h.session.position_seconds(), 179.0);

    h.session.report_external_state(ExternalState::Ended);
    assert_eq!(
        h.frame(h.at(2)),
        vec![PlayerCall::SeekTo(0.0), PlayerCall::Play]
    );
    assert_eq!(h.session.position_seconds(), 0.0);
    assert_eq!(h.player.time, Some(0.0));
}

#[test]
fn reselecting_current_track_seeks_to_start() {
    let mut h = Harness::new();
    h.session
        .start_queue(create_test_tracks(&["1", "2"]), 1, "pl1")
        .unwrap();
    h.frame(h.at(0));

    h.session.select_track(1);
    assert_eq!(
        h.frame(h.at(1)),
        vec![PlayerCall::SeekTo(0.0), PlayerCall::Play]
    );
}

#[test]
fn user_pause_is_sent_once_and_stops_polling() {
    let mut h = Harness::new();
    h.session
        .start_queue(create_test_tracks(&["1"]), 0, "pl1")
        .unwrap();
    h.frame(h.at(0));
    h.session.report_external_state(ExternalState::Playing);
    h.frame(h.at(0));

    h.session.toggle_play_pause();
    assert_eq!(h.frame(h.at(1)), vec![PlayerCall::Pause]);
    assert_eq!(h.poller.state(), PollerState::Idle);

    // Player confirms; nothing is echoed back
    h.session.report_external_state(ExternalState::Paused);
    assert!(h.frame(h.at(2)).is_empty());

    h.session.toggle_play_pause();
    assert_eq!(h.frame(h.at(3)), vec![PlayerCall::Play]);
    assert!(h.poller.is_active());
}

#[test]
fn seek_drag_holds_progress() {
    let mut h = Harness::new();
    h.session
        .start_queue(create_test_tracks(&["1"]), 0, "pl1")
        .unwrap();
    h.frame(h.at(0));
    h.player.time = Some(10.0);

    h.poller.begin_seek();
    h.frame(h.at(1));
    assert_eq!(h.session.position_seconds(), 0.0);

    h.player.time = Some(95.0);
    h.poller.end_seek(h.at(2));
    h.frame(h.at(2));
    assert_eq!(h.session.position_seconds(), 0.0);

    h.frame(h.at(3));
    assert_eq!(h.session.position_seconds(), 95.0);
}

#[test]
fn stop_pauses_player_and_cancels_poller() {
    let mut h = Harness::new();
    h.session
        .start_queue(create_test_tracks(&["1", "2"]), 0, "pl1")
        .unwrap();
    h.frame(h.at(0));

    h.session.stop();
    assert_eq!(h.frame(h.at(1)), vec![PlayerCall::Pause]);
    assert_eq!(h.poller.state(), PollerState::Idle);

    h.session.toggle_play_pause();
    assert_eq!(h.frame(h.at(2)), vec![load("1"), PlayerCall::Play]);
}

#[test]
fn adapter_failure_is_returned() {
    init_tracing();
    let mut session = SessionController::default();
    session
        .start_queue(create_test_tracks(&["1"]), 0, "pl1")
        .unwrap();
    let mut sync = AdapterSync::new();
    let mut player = RecordingPlayer::new();
    player.fail_loads = true;

    let result = sync.apply(session.snapshot(), &mut player);

    assert!(matches!(result, Err(PlaybackError::Adapter(_))));
    assert!(player.calls.is_empty());
}

#[test]
fn failed_commands_are_replanned_on_retry() {
    init_tracing();
    let mut session = SessionController::default();
    session
        .start_queue(create_test_tracks(&["1"]), 0, "pl1")
        .unwrap();
    let mut sync = AdapterSync::new();
    let mut player = RecordingPlayer::new();
    player.fail_loads = true;
    assert!(sync.apply(session.snapshot(), &mut player).is_err());

    player.fail_loads = false;
    let commands = sync.apply(session.snapshot(), &mut player).unwrap();

    assert_eq!(commands.len(), 2);
    assert_eq!(player.take_calls(), vec![load("1"), PlayerCall::Play]);
    assert_eq!(player.loaded.as_ref().map(|id| id.as_str()), Some("00000000001"));
    assert!(sync.apply(session.snapshot(), &mut player).unwrap().is_empty());
}

#[test]
fn plan_reports_commands_for_recreated_player_view() {
    init_tracing();
    let mut session = SessionController::default();
    session
        .start_queue(create_test_tracks(&["1", "2"]), 1, "pl1")
        .unwrap();
    session.toggle_play_pause();
    let mut sync = AdapterSync::new();
    sync.plan(session.snapshot());

    sync.reset();
    let commands = sync.plan(session.snapshot());

    assert_eq!(commands.len(), 1);
    assert!(matches!(&commands[0], AdapterCommand::Load(id) if id.as_str() == "00000000002"));
}
