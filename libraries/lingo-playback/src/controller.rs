//! Session controller - core orchestration
//!
//! Owns the queue, the user's play/pause intent, the last state reported by
//! the embedded player, and playback progress. Every command is a synchronous
//! transition over that state; none of them talk to the player. The UI layer
//! reacts to the published snapshot and drives the player (see
//! [`crate::AdapterSync`]).
//!
//! Intent and external state are separate on purpose: player events lag and
//! reorder relative to user actions, so they are merged into intent only at
//! `Playing`, `Paused`, and `Ended`.

use crate::{
    config::PlaybackConfig,
    error::{PlaybackError, Result},
    events::{SessionEvent, SessionSnapshot, SubscriptionId, Subscribers},
    queue::{Advance, TrackQueue},
    types::{ExternalState, SourceContext, Track},
};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Central playback session
///
/// One instance per running app, owned by the UI layer and passed by
/// reference to every surface. Not `Sync`: it lives on the event-loop thread.
#[derive(Debug)]
pub struct SessionController {
    // Queue and intent
    queue: TrackQueue,
    intent_playing: bool,
    is_looping: bool,

    // Reported by the player
    external_state: ExternalState,

    // Progress
    position_seconds: f64,
    duration_seconds: f64,
    restart_epoch: u64,

    config: PlaybackConfig,

    // Last published view
    published: SessionSnapshot,

    // Event queue for UI synchronization
    pending_events: VecDeque<SessionEvent>,
    subscribers: Subscribers,
}

impl SessionController {
    /// Create an empty session
    pub fn new(config: PlaybackConfig) -> Self {
        let mut controller = Self {
            queue: TrackQueue::new(),
            intent_playing: false,
            is_looping: config.loop_by_default,
            external_state: ExternalState::Unstarted,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            restart_epoch: 0,
            config,
            published: SessionSnapshot::default(),
            pending_events: VecDeque::new(),
            subscribers: Subscribers::default(),
        };
        controller.published = controller.build_snapshot();
        controller
    }

    // ===== Queue Loading =====

    /// Replace the queue and start playing at `start_index`
    ///
    /// `start_index` is clamped into the queue. Intent becomes true only if
    /// the start track resolved to a playable media id.
    ///
    /// Calling this with no tracks is a caller bug: the UI should show an
    /// empty state instead. It is rejected with [`PlaybackError::EmptyQueue`]
    /// and leaves the session untouched.
    pub fn start_queue(
        &mut self,
        tracks: Vec<Track>,
        start_index: usize,
        source_context: impl Into<SourceContext>,
    ) -> Result<()> {
        if tracks.is_empty() {
            warn!("start_queue called with an empty track list");
            return Err(PlaybackError::EmptyQueue);
        }

        let start = start_index.min(tracks.len() - 1);
        let mut queue = TrackQueue::from_tracks(tracks, source_context.into())?;
        queue.jump_to(start);
        self.replace_queue(queue);

        self.land_on_current(None);
        self.intent_playing = self.current_is_playable();

        info!(
            length = self.queue.len(),
            start_index = start,
            playable = self.intent_playing,
            "Queue started"
        );
        self.publish();
        Ok(())
    }

    /// Replace the queue without starting playback
    ///
    /// The session ends up with no current track; `toggle_play_pause` or
    /// `select_track` starts it. An empty list is allowed and simply empties
    /// the queue.
    pub fn load_queue(
        &mut self,
        tracks: Vec<Track>,
        source_context: impl Into<SourceContext>,
    ) -> Result<()> {
        let queue = TrackQueue::from_tracks(tracks, source_context.into())?;
        self.replace_queue(queue);

        self.intent_playing = false;
        self.position_seconds = 0.0;
        self.duration_seconds = 0.0;

        info!(length = self.queue.len(), "Queue loaded");
        self.publish();
        Ok(())
    }

    // ===== Navigation =====

    /// Advance to the next track, restart it when looping, or finish
    pub fn play_next(&mut self) {
        self.next_transition();
        self.publish();
    }

    /// Go back one track
    ///
    /// No-op at the head of the queue. Leaves intent as it was, except that
    /// it never stays true on a track that cannot play.
    pub fn play_previous(&mut self) {
        let previous = self.queue.current_index();
        if self.queue.retreat().is_none() {
            debug!(?previous, "play_previous ignored at queue head");
            return;
        }

        self.land_on_current(previous);
        self.intent_playing = self.intent_playing && self.current_is_playable();
        self.publish();
    }

    /// Jump to `index` and play it
    ///
    /// Out-of-range indices are ignored.
    pub fn select_track(&mut self, index: usize) {
        self.select_track_inner(index);
        self.publish();
    }

    // ===== Playback Control =====

    /// Flip play/pause
    ///
    /// A stopped session with a loaded queue restarts at the head.
    pub fn toggle_play_pause(&mut self) {
        if self.queue.current_index().is_none() {
            if self.queue.is_empty() {
                debug!("toggle_play_pause ignored on an empty session");
                return;
            }
            self.select_track_inner(0);
        } else if self.intent_playing {
            self.intent_playing = false;
        } else if self.current_is_playable() {
            self.intent_playing = true;
        } else {
            debug!("toggle_play_pause cannot play an unresolvable track");
        }
        self.publish();
    }

    /// Enable or disable looping of the current track
    pub fn set_looping(&mut self, enabled: bool) {
        if self.is_looping != enabled {
            self.is_looping = enabled;
            self.emit(SessionEvent::LoopingChanged { enabled });
            self.publish();
        }
    }

    /// Stop playback and clear the current track, keeping the queue
    pub fn stop(&mut self) {
        if self.queue.current_index().is_none() && !self.intent_playing {
            return;
        }

        self.queue.clear_cursor();
        self.intent_playing = false;
        self.position_seconds = 0.0;
        self.duration_seconds = 0.0;
        self.emit(SessionEvent::Stopped);

        info!("Playback stopped");
        self.publish();
    }

    /// Tear the session down to its initial empty state
    ///
    /// The looping flag is a user preference and survives.
    pub fn clear(&mut self) {
        let had_queue = !self.queue.is_empty();
        self.queue = TrackQueue::new();
        self.intent_playing = false;
        self.external_state = ExternalState::Unstarted;
        self.position_seconds = 0.0;
        self.duration_seconds = 0.0;
        if had_queue {
            self.emit(SessionEvent::Stopped);
        }
        self.publish();
    }

    // ===== Player Feedback =====

    /// Merge a state reported by the embedded player
    ///
    /// `Ended` advances (or restarts when looping), `Playing`/`Paused` are
    /// authoritative for intent, everything else is stored only. `Error`
    /// never advances: the player may recover by itself.
    pub fn report_external_state(&mut self, state: ExternalState) {
        if self.external_state != state {
            self.external_state = state;
            self.emit(SessionEvent::ExternalStateChanged { state });
        }

        match state {
            ExternalState::Ended => self.next_transition(),
            ExternalState::Playing => {
                if self.current_is_playable() {
                    self.intent_playing = true;
                } else {
                    debug!("Ignoring Playing report without a playable current track");
                }
            }
            ExternalState::Paused => self.intent_playing = false,
            ExternalState::Buffering | ExternalState::Unstarted | ExternalState::Error => {}
        }

        self.publish();
    }

    /// Store a progress sample from the poller
    ///
    /// `duration_seconds` replaces the stored duration only when positive.
    /// The position is clamped into `[0, duration]` when the duration is known.
    pub fn report_progress(&mut self, position_seconds: f64, duration_seconds: Option<f64>) {
        if self.queue.current().is_none() {
            debug!("Ignoring progress report without a current track");
            return;
        }

        if let Some(duration) = duration_seconds {
            if duration.is_finite() && duration > 0.0 {
                self.duration_seconds = duration;
            }
        }

        let mut position = if position_seconds.is_nan() {
            self.position_seconds
        } else {
            position_seconds.max(0.0)
        };
        if self.duration_seconds > 0.0 {
            position = position.min(self.duration_seconds);
        } else if position.is_infinite() {
            position = self.position_seconds;
        }
        self.position_seconds = position;

        if self.position_seconds != self.published.position_seconds
            || self.duration_seconds != self.published.duration_seconds
        {
            self.emit(SessionEvent::ProgressUpdated {
                position_seconds: self.position_seconds,
                duration_seconds: self.duration_seconds,
            });
        }
        self.publish();
    }

    // ===== State Queries =====

    /// Current read-only view of the session
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.published
    }

    /// Track under the cursor
    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current()
    }

    /// Cursor position (`None` = no current track)
    pub fn current_index(&self) -> Option<usize> {
        self.queue.current_index()
    }

    /// The loaded queue
    pub fn queue(&self) -> &TrackQueue {
        &self.queue
    }

    /// Whether the user wants playback
    pub fn intent_playing(&self) -> bool {
        self.intent_playing
    }

    /// Whether the current track loops
    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    /// Last state reported by the player
    pub fn external_state(&self) -> ExternalState {
        self.external_state
    }

    /// Stored position in seconds
    pub fn position_seconds(&self) -> f64 {
        self.position_seconds
    }

    /// Stored duration in seconds (0 = unknown)
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Active configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // ===== Subscriptions & Events =====

    /// Register a snapshot listener
    ///
    /// Called synchronously after every command that changed the snapshot.
    /// Listeners must not call back into the controller.
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionSnapshot) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(Box::new(listener))
    }

    /// Remove a snapshot listener
    ///
    /// Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Number of registered listeners
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drain all pending events
    ///
    /// Returns all events emitted since the last drain, oldest first. At most
    /// `max_pending_events` are kept; older ones are dropped.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.pending_events.drain(..).collect()
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    fn replace_queue(&mut self, queue: TrackQueue) {
        self.queue = queue;
        self.external_state = ExternalState::Unstarted;
        self.emit(SessionEvent::QueueLoaded {
            length: self.queue.len(),
            source_context: self.queue.source_context().clone(),
            start_index: self.queue.current_index(),
        });
    }

    /// Shared by `play_next` and the `Ended` report
    fn next_transition(&mut self) {
        let Some(index) = self.queue.current_index() else {
            debug!("next ignored without a current track");
            return;
        };

        if self.is_looping {
            self.restart_current(index);
            return;
        }

        match self.queue.advance() {
            Advance::Moved(_) => {
                self.land_on_current(Some(index));
                self.intent_playing = self.current_is_playable();
            }
            Advance::Finished => {
                self.intent_playing = false;
                self.emit(SessionEvent::QueueFinished { last_index: index });
                info!(last_index = index, "Queue finished");
            }
            Advance::NoCurrent => {}
        }
    }

    fn select_track_inner(&mut self, index: usize) {
        let previous = self.queue.current_index();
        if !self.queue.jump_to(index) {
            debug!(index, length = self.queue.len(), "select_track ignored out of range");
            return;
        }

        self.land_on_current(previous);
        self.intent_playing = self.current_is_playable();
    }

    /// Loop restart: same track, position back to 0, keep playing
    fn restart_current(&mut self, index: usize) {
        self.reset_position();
        self.intent_playing = self.current_is_playable();
        if let Some(track) = self.queue.current() {
            let track_id = track.id.clone();
            debug!(index, track_id = %track_id, "Restarting looped track");
            self.emit(SessionEvent::TrackRestarted { index, track_id });
        }
    }

    /// Reset progress for the track now under the cursor
    fn land_on_current(&mut self, previous: Option<usize>) {
        self.reset_position();
        self.duration_seconds = self.queue.current().map_or(0.0, Track::initial_duration);

        if let (Some(index), Some(track)) = (self.queue.current_index(), self.queue.current()) {
            if previous == Some(index) {
                let track_id = track.id.clone();
                self.emit(SessionEvent::TrackRestarted { index, track_id });
            }
        }
    }

    fn reset_position(&mut self) {
        self.position_seconds = 0.0;
        self.restart_epoch += 1;
    }

    fn current_is_playable(&self) -> bool {
        self.queue.current().is_some_and(Track::is_playable)
    }

    fn build_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_track: self.queue.current().cloned(),
            current_index: self.queue.current_index(),
            intent_playing: self.intent_playing,
            is_looping: self.is_looping,
            external_state: self.external_state,
            position_seconds: self.position_seconds,
            duration_seconds: self.duration_seconds,
            queue_len: self.queue.len(),
            source_context: self.queue.source_context().clone(),
            restart_epoch: self.restart_epoch,
            intent_generation: self.published.intent_generation,
            revision: self.published.revision,
        }
    }

    /// Publish the snapshot if anything observable changed
    fn publish(&mut self) {
        let next = self.build_snapshot();
        if next == self.published {
            return;
        }

        let previous_track_id = self.published.current_track.as_ref().map(|t| t.id.clone());
        if let (Some(index), Some(track)) = (next.current_index, next.current_track.as_ref()) {
            let moved = self.published.current_index != Some(index)
                || previous_track_id.as_deref() != Some(track.id.as_str());
            if moved {
                self.emit(SessionEvent::TrackChanged {
                    index,
                    track_id: track.id.clone(),
                    previous_track_id,
                });
            }
        }

        let intent_flipped = next.intent_playing != self.published.intent_playing;
        if intent_flipped {
            self.emit(SessionEvent::IntentChanged {
                playing: next.intent_playing,
            });
        }

        self.published = SessionSnapshot {
            intent_generation: self.published.intent_generation + u64::from(intent_flipped),
            revision: self.published.revision + 1,
            ..next
        };
        self.subscribers.notify(&self.published);
    }

    fn emit(&mut self, event: SessionEvent) {
        if self.pending_events.len() >= self.config.max_pending_events {
            self.pending_events.pop_front();
        }
        self.pending_events.push_back(event);
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}
