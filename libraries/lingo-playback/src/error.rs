//! Error types for the playback session

use thiserror::Error;

/// Playback errors
///
/// Navigation commands never fail; these only surface from queue loading,
/// adapter calls, and configuration.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// A queue was started with no tracks
    #[error("Cannot start an empty queue")]
    EmptyQueue,

    /// Two tracks in one queue share an id
    #[error("Duplicate track id in queue: {0}")]
    DuplicateTrackId(String),

    /// The external player rejected a command
    #[error("Player adapter error: {0}")]
    Adapter(String),

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
