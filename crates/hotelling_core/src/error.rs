//! Error types for the round engine.

use thiserror::Error;

use crate::round::Phase;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for engine operations.
///
/// Every variant except [`EngineError::Configuration`] is a rejected
/// request: the engine state is left untouched and the session continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Operation attempted outside the phase in which it is legal.
    #[error("Cannot {operation} during {phase}")]
    InvalidStateOperation {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Phase the engine was in.
        phase: Phase,
    },

    /// Missing or out-of-range session configuration.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Player index outside `[0, player_count)`.
    #[error("Unknown player {player} (session has {player_count} players)")]
    UnknownPlayer {
        /// Requested player index.
        player: u32,
        /// Players in the session.
        player_count: u32,
    },

    /// Position outside the map.
    #[error("Position ({x}, {y}) is outside the {width}x{height} map")]
    PositionOutOfBounds {
        /// Requested x coordinate.
        x: f64,
        /// Requested y coordinate.
        y: f64,
        /// Map width.
        width: f64,
        /// Map height.
        height: f64,
    },
}

impl EngineError {
    /// Whether the error only rejected a request (the session is intact).
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }
}
