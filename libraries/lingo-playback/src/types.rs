//! Core types for the playback session

use crate::media_id::{self, ExternalMediaId};
use serde::{Deserialize, Serialize};

/// An item in a playback queue
///
/// Comes from the backend track list. `external_media_id` is never trusted
/// from input: it is derived from `media_uri` when the track enters a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Stable identifier, unique within a queue
    pub id: String,

    /// Source locator as stored by the backend
    pub media_uri: String,

    /// Id the embedded player can play (absent if unresolvable)
    #[serde(skip_deserializing)]
    pub external_media_id: Option<ExternalMediaId>,

    /// Track title
    pub title: String,

    /// Artist name (optional)
    #[serde(default)]
    pub artist: Option<String>,

    /// Artwork locator (optional)
    #[serde(default)]
    pub artwork_uri: Option<String>,

    /// Duration in seconds, if the backend knows it
    #[serde(default)]
    pub known_duration: Option<f64>,
}

impl Track {
    /// Create a track with only the required fields
    pub fn new(id: impl Into<String>, media_uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_uri: media_uri.into(),
            external_media_id: None,
            title: title.into(),
            artist: None,
            artwork_uri: None,
            known_duration: None,
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    #[must_use]
    pub fn with_artwork(mut self, artwork_uri: impl Into<String>) -> Self {
        self.artwork_uri = Some(artwork_uri.into());
        self
    }

    #[must_use]
    pub fn with_known_duration(mut self, seconds: f64) -> Self {
        self.known_duration = Some(seconds);
        self
    }

    /// Re-derive `external_media_id` from `media_uri`
    pub(crate) fn resolve_media_id(&mut self) {
        self.external_media_id = media_id::resolve(&self.media_uri);
    }

    /// Whether the embedded player can play this track
    pub fn is_playable(&self) -> bool {
        self.external_media_id.is_some()
    }

    /// Known duration as a valid seconds value, or 0 when unknown
    pub fn initial_duration(&self) -> f64 {
        match self.known_duration {
            Some(seconds) if seconds.is_finite() && seconds > 0.0 => seconds,
            _ => 0.0,
        }
    }
}

/// Provenance of a queue
///
/// Tells the UI which list the queue was started from (e.g. to highlight the
/// playing row of a playlist screen).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceContext {
    /// Queue built from a playlist
    Playlist { id: String, name: String },

    /// Free-form tag supplied by the caller
    Tag(String),

    /// No provenance
    #[default]
    Unknown,
}

impl From<&str> for SourceContext {
    fn from(tag: &str) -> Self {
        SourceContext::Tag(tag.to_string())
    }
}

impl From<String> for SourceContext {
    fn from(tag: String) -> Self {
        SourceContext::Tag(tag)
    }
}

/// Last state reported by the embedded player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExternalState {
    /// Nothing loaded yet, or a new track was cued
    #[default]
    Unstarted,

    /// Waiting on the network
    Buffering,

    /// Media is advancing
    Playing,

    /// Media is stalled by the user or the player
    Paused,

    /// Media reached its end
    Ended,

    /// The player reported a failure
    Error,
}
