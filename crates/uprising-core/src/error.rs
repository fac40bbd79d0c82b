//! Service-level error type.

use uprising_raids::RaidError;
use uprising_world::WorldError;

use crate::config::ConfigError;

/// Errors surfaced by the raid service facade.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A requested countdown length is outside the configured bounds.
    #[error("countdown of {seconds}s outside allowed range {min}..={max}")]
    CountdownOutOfRange {
        /// The requested length.
        seconds: u32,
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },

    /// A raid operation failed.
    #[error(transparent)]
    Raid {
        /// The underlying raid error.
        #[from]
        source: RaidError,
    },

    /// A world registry operation failed.
    #[error(transparent)]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },
}
