//! External player boundary
//!
//! The embedded video player is a black box owned by the UI layer. This crate
//! only describes the handle it needs; platforms (webview bridge, native
//! player, test fakes) implement it.

use crate::error::Result;
use crate::media_id::ExternalMediaId;

/// Imperative handle to the embedded player
///
/// Commands are fire-and-forget: the player confirms asynchronously through
/// state events forwarded to
/// [`SessionController::report_external_state`](crate::SessionController::report_external_state).
pub trait PlayerAdapter {
    /// Cue a new media id (the player reports `Unstarted`/`Buffering` next)
    fn load(&mut self, media_id: &ExternalMediaId) -> Result<()>;

    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Seek to a position in seconds
    fn seek_to(&mut self, seconds: f64) -> Result<()>;

    /// Current playback position in seconds, if the player knows it
    fn current_time(&self) -> Option<f64>;

    /// Media duration in seconds, if the player knows it
    fn duration(&self) -> Option<f64>;
}
