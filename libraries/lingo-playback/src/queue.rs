//! Track queue with a non-destructive cursor
//!
//! The queue never reorders or drops tracks while playing: navigation only
//! moves the cursor, so "previous" always finds the track it left.
//!
//! ```text
//!   [ T1 ][ T2 ][ T3 ][ T4 ]
//!           ^ cursor (Some(1))
//! ```
//!
//! A cursor of `None` means "no current track" (the session's −1 index).

use crate::error::{PlaybackError, Result};
use crate::types::{SourceContext, Track};
use std::collections::HashSet;

/// Outcome of moving the cursor forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Cursor moved to this index
    Moved(usize),

    /// Cursor was on the last track; it stays there
    Finished,

    /// There was no current track
    NoCurrent,
}

/// Ordered, finite list of tracks plus the current position
#[derive(Debug, Clone, Default)]
pub struct TrackQueue {
    tracks: Vec<Track>,
    source_context: SourceContext,
    cursor: Option<usize>,
}

impl TrackQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue from tracks, resolving each track's media id
    ///
    /// The cursor starts cleared. Rejects duplicate ids.
    pub fn from_tracks(mut tracks: Vec<Track>, source_context: SourceContext) -> Result<Self> {
        {
            let mut seen = HashSet::with_capacity(tracks.len());
            for track in &tracks {
                if !seen.insert(track.id.as_str()) {
                    return Err(PlaybackError::DuplicateTrackId(track.id.clone()));
                }
            }
        }

        for track in &mut tracks {
            track.resolve_media_id();
        }

        Ok(Self {
            tracks,
            source_context,
            cursor: None,
        })
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Get track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Iterate tracks in queue order
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Where this queue came from
    pub fn source_context(&self) -> &SourceContext {
        &self.source_context
    }

    /// Current cursor position
    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|index| self.tracks.get(index))
    }

    /// Whether the cursor sits on the last track
    pub fn is_last(&self) -> bool {
        matches!(self.cursor, Some(index) if index + 1 == self.tracks.len())
    }

    /// Move the cursor to `index`
    ///
    /// Returns false (and leaves the cursor alone) when out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.cursor = Some(index);
            true
        } else {
            false
        }
    }

    /// Move the cursor forward by one without wrapping
    pub fn advance(&mut self) -> Advance {
        match self.cursor {
            None => Advance::NoCurrent,
            Some(index) if index + 1 < self.tracks.len() => {
                self.cursor = Some(index + 1);
                Advance::Moved(index + 1)
            }
            Some(_) => Advance::Finished,
        }
    }

    /// Move the cursor back by one without wrapping
    ///
    /// Returns the new index, or `None` if already at the head (or no cursor).
    pub fn retreat(&mut self) -> Option<usize> {
        match self.cursor {
            Some(index) if index > 0 => {
                self.cursor = Some(index - 1);
                self.cursor
            }
            _ => None,
        }
    }

    /// Clear the cursor, keeping the tracks
    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }
}
