//! Playback configuration
//!
//! Loaded from an optional TOML file, then overridden by `LINGO_PLAYBACK_*`
//! environment variables (e.g. `LINGO_PLAYBACK_POLL_INTERVAL_MS=500`).

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix
const ENV_PREFIX: &str = "LINGO_PLAYBACK";

/// Allowed poll interval range in milliseconds
const POLL_INTERVAL_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=10_000;

/// Configuration for the session controller and progress poller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Progress poll period in milliseconds (default: 1000)
    pub poll_interval_ms: u64,

    /// Initial looping flag for a new session (default: false)
    pub loop_by_default: bool,

    /// Maximum undrained events kept; oldest are dropped (default: 256)
    pub max_pending_events: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            loop_by_default: false,
            max_pending_events: 256,
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path).required(true));
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !POLL_INTERVAL_RANGE_MS.contains(&self.poll_interval_ms) {
            return Err(PlaybackError::Config(format!(
                "poll_interval_ms must be within {}..={}, got {}",
                POLL_INTERVAL_RANGE_MS.start(),
                POLL_INTERVAL_RANGE_MS.end(),
                self.poll_interval_ms
            )));
        }

        if self.max_pending_events == 0 {
            return Err(PlaybackError::Config(
                "max_pending_events must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Poll period as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
