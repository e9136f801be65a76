//! Lingo - Playback Session
//!
//! Playback session controller for the Lingo mobile client.
//!
//! This crate provides:
//! - A track queue with non-wrapping next/previous/select navigation
//! - Separate play intent and player-reported state, reconciled on
//!   `Playing`, `Paused`, and `Ended`
//! - Loop-current-track semantics
//! - Progress tracking with clamping, plus the poller activation rule
//! - Snapshots and events so several UI surfaces render the same state
//! - Media id resolution for the embedded video player
//!
//! # Architecture
//!
//! `lingo-playback` knows nothing about rendering or networking:
//! - The embedded player is reached through the [`PlayerAdapter`] trait
//! - Commands only change in-memory state; [`AdapterSync`] turns snapshot
//!   changes into player commands on the UI side
//! - Everything runs on the UI thread; there are no locks or workers
//!
//! # Example: Basic Session
//!
//! ```rust
//! use lingo_playback::{ExternalState, SessionController, Track};
//!
//! let mut session = SessionController::default();
//!
//! let tracks = vec![
//!     Track::new("t1", "https://youtu.be/dQw4w9WgXcQ", "Greetings").with_known_duration(212.0),
//!     Track::new("t2", "https://www.youtube.com/watch?v=9bZkp7q19f0", "Numbers"),
//! ];
//! session.start_queue(tracks, 0, "playlist-42").unwrap();
//! assert!(session.snapshot().intent_playing);
//!
//! // Forwarded from the player
//! session.report_external_state(ExternalState::Playing);
//! session.report_progress(30.0, Some(212.0));
//!
//! // Track ended, move on
//! session.report_external_state(ExternalState::Ended);
//! assert_eq!(session.snapshot().current_index, Some(1));
//! ```
//!
//! # Example: Driving the Player
//!
//! ```rust,no_run
//! use lingo_playback::{AdapterSync, PlayerAdapter, ProgressPoller, SessionController};
//! use std::time::Instant;
//!
//! fn on_frame(
//!     session: &mut SessionController,
//!     sync: &mut AdapterSync,
//!     poller: &mut ProgressPoller,
//!     player: &mut dyn PlayerAdapter,
//! ) {
//!     let now = Instant::now();
//!     let snapshot = session.snapshot().clone();
//!     if let Err(e) = sync.apply(&snapshot, player) {
//!         tracing::warn!(error = %e, "Player rejected command");
//!     }
//!
//!     poller.sync(&snapshot, now);
//!     poller.tick(now, session, &*player);
//! }
//! ```

mod adapter;
mod config;
mod controller;
mod error;
mod events;
pub mod media_id;
mod poller;
mod queue;
mod sync;
pub mod types;

// Public exports
pub use adapter::PlayerAdapter;
pub use config::PlaybackConfig;
pub use controller::SessionController;
pub use error::{PlaybackError, Result};
pub use events::{SessionEvent, SessionSnapshot, SubscriptionId};
pub use media_id::ExternalMediaId;
pub use poller::{PollerState, ProgressPoller};
pub use queue::{Advance, TrackQueue};
pub use sync::{AdapterCommand, AdapterSync};
pub use types::{ExternalState, SourceContext, Track};
