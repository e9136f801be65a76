//! Progress poller
//!
//! The embedded player does not push its position, so the UI polls it. The
//! poller runs if and only if the session intends to play and has a current
//! track. Transient player states (`Buffering`) do not stop it; a user
//! dragging the seek bar suspends it so polled positions do not fight the
//! drag.
//!
//! Time is passed in as `Instant` so the UI drives it from its own timer and
//! tests stay deterministic.

use crate::adapter::PlayerAdapter;
use crate::controller::SessionController;
use crate::events::SessionSnapshot;
use std::time::{Duration, Instant};
use tracing::debug;

/// Poller lifecycle as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// No timer (paused, stopped, or nothing loaded)
    Idle,
    /// Timer running
    Active,
    /// Timer exists but the user is dragging the seek control
    Suspended,
}

/// Timer armed for one (track, play intent) pair
#[derive(Debug, Clone)]
struct Armed {
    index: usize,
    track_id: String,
    intent_generation: u64,
    next_due: Instant,
}

/// Conditional progress timer
#[derive(Debug)]
pub struct ProgressPoller {
    interval: Duration,
    armed: Option<Armed>,
    seeking: bool,
    generation: u64,
}

impl ProgressPoller {
    /// Create an idle poller ticking every `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            armed: None,
            seeking: false,
            generation: 0,
        }
    }

    /// Poll period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Current lifecycle state
    pub fn state(&self) -> PollerState {
        match (&self.armed, self.seeking) {
            (None, _) => PollerState::Idle,
            (Some(_), true) => PollerState::Suspended,
            (Some(_), false) => PollerState::Active,
        }
    }

    /// Whether ticks currently report progress
    pub fn is_active(&self) -> bool {
        self.state() == PollerState::Active
    }

    /// Number of timers created so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply the activation rule to a fresh snapshot
    ///
    /// Tears the timer down when the session stops intending to play and
    /// recreates it when playback intent returns or the track changes. An
    /// intent flip that was never observed (pause then resume between two
    /// calls) still recreates it.
    pub fn sync(&mut self, snapshot: &SessionSnapshot, now: Instant) {
        let target = match (snapshot.intent_playing, snapshot.current_index, &snapshot.current_track) {
            (true, Some(index), Some(track)) => Some((index, track.id.as_str())),
            _ => None,
        };

        let Some((index, track_id)) = target else {
            self.cancel();
            return;
        };

        let unchanged = self.armed.as_ref().is_some_and(|armed| {
            armed.index == index
                && armed.track_id == track_id
                && armed.intent_generation == snapshot.intent_generation
        });
        if unchanged {
            return;
        }

        self.generation += 1;
        self.armed = Some(Armed {
            index,
            track_id: track_id.to_string(),
            intent_generation: snapshot.intent_generation,
            next_due: now + self.interval,
        });
        debug!(index, track_id, generation = self.generation, "Progress poller started");
    }

    /// The user started dragging the seek control
    pub fn begin_seek(&mut self) {
        self.seeking = true;
    }

    /// The user released the seek control
    ///
    /// The next tick is a full interval away so the released position is not
    /// immediately overwritten by a stale poll.
    pub fn end_seek(&mut self, now: Instant) {
        self.seeking = false;
        if let Some(armed) = &mut self.armed {
            armed.next_due = now + self.interval;
        }
    }

    /// Whether a tick should run at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        match &self.armed {
            Some(armed) if !self.seeking => now >= armed.next_due,
            _ => false,
        }
    }

    /// Run one tick if due
    ///
    /// Reads the player's time and duration and reports them to the
    /// controller. A timer left over from a session that moved on is
    /// cancelled instead. Returns true when progress was reported.
    pub fn tick(
        &mut self,
        now: Instant,
        controller: &mut SessionController,
        adapter: &dyn PlayerAdapter,
    ) -> bool {
        if !self.is_due(now) {
            return false;
        }

        let snapshot = controller.snapshot();
        let still_current = match (&self.armed, snapshot.current_index, &snapshot.current_track) {
            (Some(armed), Some(index), Some(track)) => {
                snapshot.intent_playing && armed.index == index && armed.track_id == track.id
            }
            _ => false,
        };
        if !still_current {
            debug!("Cancelling stale progress poller");
            self.cancel();
            return false;
        }

        if let Some(armed) = &mut self.armed {
            armed.next_due = now + self.interval;
        }

        match adapter.current_time() {
            Some(position) => {
                controller.report_progress(position, adapter.duration());
                true
            }
            None => false,
        }
    }

    /// Tear the timer down
    pub fn cancel(&mut self) {
        if self.armed.take().is_some() {
            debug!(generation = self.generation, "Progress poller stopped");
        }
        self.seeking = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::media_id::ExternalMediaId;
    use crate::types::{ExternalState, Track};

    struct FixedClock {
        time: Option<f64>,
        duration: Option<f64>,
    }

    impl PlayerAdapter for FixedClock {
        fn load(&mut self, _media_id: &ExternalMediaId) -> Result<()> {
            Ok(())
        }
        fn play(&mut self) -> Result<()> {
            Ok(())
        }
        fn pause(&mut self) -> Result<()> {
            Ok(())
        }
        fn seek_to(&mut self, _seconds: f64) -> Result<()> {
            Ok(())
        }
        fn current_time(&self) -> Option<f64> {
            self.time
        }
        fn duration(&self) -> Option<f64> {
            self.duration
        }
    }

    const SECOND: Duration = Duration::from_secs(1);

    fn started() -> SessionController {
        let tracks = vec![
            Track::new("1", "https://youtu.be/00000000001", "One"),
            Track::new("2", "https://youtu.be/00000000002", "Two"),
        ];
        let mut controller = SessionController::default();
        controller.start_queue(tracks, 0, "pl1").unwrap();
        controller
    }

    #[test]
    fn idle_until_playing() {
        let mut poller = ProgressPoller::new(SECOND);
        let t0 = Instant::now();
        assert_eq!(poller.state(), PollerState::Idle);

        poller.sync(&SessionSnapshot::default(), t0);
        assert_eq!(poller.state(), PollerState::Idle);

        let controller = started();
        poller.sync(controller.snapshot(), t0);
        assert_eq!(poller.state(), PollerState::Active);
        assert_eq!(poller.generation(), 1);
        assert!(!poller.is_due(t0));
        assert!(poller.is_due(t0 + SECOND));
    }

    #[test]
    fn intent_flip_recreates_timer() {
        let mut poller = ProgressPoller::new(SECOND);
        let mut controller = started();
        let t0 = Instant::now();
        poller.sync(controller.snapshot(), t0);

        controller.toggle_play_pause();
        poller.sync(controller.snapshot(), t0);
        assert_eq!(poller.state(), PollerState::Idle);

        controller.toggle_play_pause();
        poller.sync(controller.snapshot(), t0);
        assert_eq!(poller.state(), PollerState::Active);
        assert_eq!(poller.generation(), 2);
    }

    #[test]
    fn unobserved_intent_flip_recreates_timer() {
        let mut poller = ProgressPoller::new(SECOND);
        let mut controller = started();
        let t0 = Instant::now();
        poller.sync(controller.snapshot(), t0);

        controller.toggle_play_pause();
        controller.toggle_play_pause();
        poller.sync(controller.snapshot(), t0 + SECOND / 2);

        assert!(poller.is_active());
        assert_eq!(poller.generation(), 2);
        assert!(!poller.is_due(t0 + SECOND));
        assert!(poller.is_due(t0 + SECOND + SECOND / 2));
    }

    #[test]
    fn progress_reports_keep_the_same_timer() {
        let mut poller = ProgressPoller::new(SECOND);
        let mut controller = started();
        let t0 = Instant::now();
        poller.sync(controller.snapshot(), t0);

        controller.report_progress(5.0, None);
        controller.report_external_state(ExternalState::Playing);
        poller.sync(controller.snapshot(), t0);

        assert_eq!(poller.generation(), 1);
    }

    #[test]
    fn buffering_keeps_polling() {
        let mut poller = ProgressPoller::new(SECOND);
        let mut controller = started();
        let t0 = Instant::now();
        poller.sync(controller.snapshot(), t0);

        controller.report_external_state(ExternalState::Buffering);
        poller.sync(controller.snapshot(), t0);
        assert!(poller.is_active());
        assert_eq!(poller.generation(), 1);
    }

    #[test]
    fn track_change_recreates_timer() {
        let mut poller = ProgressPoller::new(SECOND);
        let mut controller = started();
        let t0 = Instant::now();
        poller.sync(controller.snapshot(), t0);

        controller.play_next();
        poller.sync(controller.snapshot(), t0 + SECOND / 2);
        assert_eq!(poller.generation(), 2);
        assert!(!poller.is_due(t0 + SECOND));
    }

    #[test]
    fn tick_reports_progress() {
        let mut poller = ProgressPoller::new(SECOND);
        let mut controller = started();
        let adapter = FixedClock {
            time: Some(12.5),
            duration: Some(240.0),
        };
        let t0 = Instant::now();
        poller.sync(controller.snapshot(), t0);

        assert!(!poller.tick(t0, &mut controller, &adapter));
        assert!(poller.tick(t0 + SECOND, &mut controller, &adapter));
        assert_eq!(controller.position_seconds(), 12.5);
        assert_eq!(controller.duration_seconds(), 240.0);

        assert!(!poller.tick(t0 + SECOND, &mut controller, &adapter));
        assert!(poller.tick(t0 + SECOND * 2, &mut controller, &adapter));
    }

    #[test]
    fn tick_without_player_time_reports_nothing() {
        let mut poller = ProgressPoller::new(SECOND);
        let mut controller = started();
        let adapter = FixedClock {
            time: None,
            duration: None,
        };
        let t0 = Instant::now();
        poller.sync(controller.snapshot(), t0);

        assert!(!poller.tick(t0 + SECOND, &mut controller, &adapter));
        assert!(poller.is_active());
        assert_eq!(controller.position_seconds(), 0.0);
    }

    #[test]
    fn seek_drag_suspends_polling() {
        let mut poller = ProgressPoller::new(SECOND);
        let mut controller = started();
        let adapter = FixedClock {
            time: Some(3.0),
            duration: None,
        };
        let t0 = Instant::now();
        poller.sync(controller.snapshot(), t0);

        poller.begin_seek();
        assert_eq!(poller.state(), PollerState::Suspended);
        assert!(!poller.tick(t0 + SECOND * 5, &mut controller, &adapter));

        poller.end_seek(t0 + SECOND * 5);
        assert!(poller.is_active());
        assert!(!poller.is_due(t0 + SECOND * 5));
        assert!(poller.tick(t0 + SECOND * 6, &mut controller, &adapter));
    }

    #[test]
    fn stale_timer_cancels_itself() {
        let mut poller = ProgressPoller::new(SECOND);
        let mut controller = started();
        let adapter = FixedClock {
            time: Some(99.0),
            duration: None,
        };
        let t0 = Instant::now();
        poller.sync(controller.snapshot(), t0);

        controller.stop();
        assert!(!poller.tick(t0 + SECOND, &mut controller, &adapter));
        assert_eq!(poller.state(), PollerState::Idle);
        assert_eq!(controller.position_seconds(), 0.0);
    }
}
