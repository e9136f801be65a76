//! Session snapshots and change notification
//!
//! Presentation surfaces never read controller internals. They either
//! subscribe to snapshot changes or drain the event queue:
//! - Snapshots are published once per command that changed something
//! - Events describe *what* changed (track, intent, loop restart, ...)

use crate::media_id::ExternalMediaId;
use crate::types::{ExternalState, SourceContext, Track};
use serde::Serialize;
use std::fmt;

/// Read-only view of the session, shared by every UI surface
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionSnapshot {
    /// Track under the cursor
    pub current_track: Option<Track>,

    /// Cursor position (`None` = no current track)
    pub current_index: Option<usize>,

    /// Whether the user wants playback
    pub intent_playing: bool,

    /// Whether the current track restarts when it ends
    pub is_looping: bool,

    /// Last state reported by the player
    pub external_state: ExternalState,

    /// Playback position in seconds
    pub position_seconds: f64,

    /// Track duration in seconds (0 = unknown)
    pub duration_seconds: f64,

    /// Number of tracks in the queue
    pub queue_len: usize,

    /// Where the queue came from
    pub source_context: SourceContext,

    /// Bumped each time the position is reset to 0.
    /// A change here with the same track means "seek the player to 0".
    pub restart_epoch: u64,

    /// Bumped each time `intent_playing` flips
    pub intent_generation: u64,

    /// Bumped on every published change
    pub revision: u64,
}

impl SessionSnapshot {
    /// Whether there is a current track
    pub fn has_track(&self) -> bool {
        self.current_track.is_some()
    }

    /// Whether the current track can be handed to the player
    pub fn is_playable(&self) -> bool {
        self.current_track.as_ref().is_some_and(Track::is_playable)
    }

    /// Media id of the current track, if any
    pub fn current_media_id(&self) -> Option<&ExternalMediaId> {
        self.current_track
            .as_ref()
            .and_then(|track| track.external_media_id.as_ref())
    }

    /// Position as a fraction of the duration, 0.0 when unknown
    pub fn progress_fraction(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            (self.position_seconds / self.duration_seconds).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Events emitted by the session controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SessionEvent {
    /// A new queue replaced the old one
    QueueLoaded {
        /// Number of tracks
        length: usize,
        /// Where the queue came from
        source_context: SourceContext,
        /// Index playback starts at (`None` when loaded without starting)
        start_index: Option<usize>,
    },

    /// The current track changed
    TrackChanged {
        /// New cursor position
        index: usize,
        /// ID of the new (current) track
        track_id: String,
        /// ID of the previous track (if any)
        previous_track_id: Option<String>,
    },

    /// The user's play/pause intent changed
    IntentChanged {
        /// New intent
        playing: bool,
    },

    /// Looping was toggled
    LoopingChanged {
        /// New looping flag
        enabled: bool,
    },

    /// The player reported a new state
    ExternalStateChanged {
        /// The reported state
        state: ExternalState,
    },

    /// The current track restarts from 0 (loop)
    TrackRestarted {
        /// Cursor position (unchanged)
        index: usize,
        /// ID of the restarted track
        track_id: String,
    },

    /// Playback ran past the last track
    QueueFinished {
        /// Index the cursor stays on
        last_index: usize,
    },

    /// Position/duration were updated
    ProgressUpdated {
        /// Stored position
        position_seconds: f64,
        /// Stored duration (0 = unknown)
        duration_seconds: f64,
    },

    /// Playback was stopped explicitly or the session was cleared
    Stopped,
}

/// Handle returned by [`crate::SessionController::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SessionSnapshot)>;

/// Snapshot listeners, called in subscription order
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub(crate) fn notify(&mut self, snapshot: &SessionSnapshot) {
        for (_, listener) in &mut self.listeners {
            listener(snapshot);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.listeners.len())
            .finish()
    }
}
