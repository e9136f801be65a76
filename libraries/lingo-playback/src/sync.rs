//! Snapshot-driven player commands
//!
//! The controller decides, the UI does. `AdapterSync` is the "do" half: it
//! remembers the last snapshot it acted on and turns the next one into the
//! minimal list of imperative player commands.
//!
//! Rules, in priority order:
//! 1. Current track or media changed: load the new media (play if intended),
//!    or pause the player if the new state has nothing playable.
//! 2. Same media, `restart_epoch` moved: seek to 0 (play if intended).
//! 3. Same media, intent flipped: play or pause, unless the player already
//!    reported that state.

use crate::adapter::PlayerAdapter;
use crate::error::Result;
use crate::events::SessionSnapshot;
use crate::media_id::ExternalMediaId;
use crate::types::ExternalState;
use tracing::{debug, warn};

/// Imperative command for the embedded player
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterCommand {
    /// Cue new media
    Load(ExternalMediaId),
    /// Start or resume
    Play,
    /// Pause
    Pause,
    /// Seek to seconds
    SeekTo(f64),
}

impl AdapterCommand {
    fn execute(&self, adapter: &mut dyn PlayerAdapter) -> Result<()> {
        match self {
            AdapterCommand::Load(media_id) => adapter.load(media_id),
            AdapterCommand::Play => adapter.play(),
            AdapterCommand::Pause => adapter.pause(),
            AdapterCommand::SeekTo(seconds) => adapter.seek_to(*seconds),
        }
    }
}

/// What the player was last told
#[derive(Debug, Clone, PartialEq)]
struct Applied {
    track_id: Option<String>,
    media_id: Option<ExternalMediaId>,
    restart_epoch: u64,
    intent_playing: bool,
}

impl From<&SessionSnapshot> for Applied {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            track_id: snapshot.current_track.as_ref().map(|t| t.id.clone()),
            media_id: snapshot.current_media_id().cloned(),
            restart_epoch: snapshot.restart_epoch,
            intent_playing: snapshot.intent_playing,
        }
    }
}

/// Turns snapshot changes into player commands
#[derive(Debug, Default)]
pub struct AdapterSync {
    applied: Option<Applied>,
}

impl AdapterSync {
    /// Create a sync helper that has not acted on anything yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget what the player was told (e.g. the player view was recreated)
    pub fn reset(&mut self) {
        self.applied = None;
    }

    /// Compute the commands that bring the player in line with `snapshot`
    ///
    /// Records `snapshot` as applied.
    pub fn plan(&mut self, snapshot: &SessionSnapshot) -> Vec<AdapterCommand> {
        let next = Applied::from(snapshot);
        let mut commands = Vec::new();

        match &self.applied {
            None => {
                if let Some(media_id) = &next.media_id {
                    commands.push(AdapterCommand::Load(media_id.clone()));
                    if next.intent_playing {
                        commands.push(AdapterCommand::Play);
                    }
                }
            }
            Some(prev) if prev.track_id != next.track_id || prev.media_id != next.media_id => {
                match &next.media_id {
                    Some(media_id) => {
                        commands.push(AdapterCommand::Load(media_id.clone()));
                        if next.intent_playing {
                            commands.push(AdapterCommand::Play);
                        }
                    }
                    None if prev.media_id.is_some() => commands.push(AdapterCommand::Pause),
                    None => {}
                }
            }
            Some(prev) if prev.restart_epoch != next.restart_epoch && next.media_id.is_some() => {
                commands.push(AdapterCommand::SeekTo(0.0));
                if next.intent_playing {
                    commands.push(AdapterCommand::Play);
                }
            }
            Some(prev) if prev.intent_playing != next.intent_playing && next.media_id.is_some() => {
                let (command, confirmed) = if next.intent_playing {
                    (AdapterCommand::Play, ExternalState::Playing)
                } else {
                    (AdapterCommand::Pause, ExternalState::Paused)
                };
                if snapshot.external_state != confirmed {
                    commands.push(command);
                }
            }
            Some(_) => {}
        }

        self.applied = Some(next);
        commands
    }

    /// Plan and execute commands for `snapshot`
    ///
    /// Stops at the first failing command and forgets `snapshot`, so applying
    /// it again replans the same commands. Returns the commands executed.
    pub fn apply(
        &mut self,
        snapshot: &SessionSnapshot,
        adapter: &mut dyn PlayerAdapter,
    ) -> Result<Vec<AdapterCommand>> {
        let previous = self.applied.clone();
        let commands = self.plan(snapshot);
        for command in &commands {
            debug!(?command, "Issuing player command");
            if let Err(e) = command.execute(adapter) {
                warn!(?command, error = %e, "Player command failed");
                self.applied = previous;
                return Err(e);
            }
        }
        Ok(commands)
    }
}
