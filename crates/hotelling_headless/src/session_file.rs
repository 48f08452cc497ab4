//! Session file loading.
//!
//! Session files are RON documents holding the configuration of one
//! headless session plus the seed for its customer RNG.
//!
//! ```ron
//! (
//!     players: 2,
//!     customers: 50,
//!     map: (10.0, 10.0),
//!     round_limit: Some(5),
//!     seed: 42,
//! )
//! ```

use std::path::Path;

use hotelling_core::config::SessionConfig;
use hotelling_core::error::EngineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for session file operations.
#[derive(Error, Debug)]
pub enum SessionFileError {
    /// File not found.
    #[error("Session file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read session file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse session file: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Values out of range.
    #[error(transparent)]
    Invalid(#[from] EngineError),
}

/// A headless session description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    /// Number of players.
    pub players: u32,
    /// Customers per round.
    pub customers: u32,
    /// Map dimensions (width, height) in map units.
    pub map: (f64, f64),
    /// Optional round limit.
    #[serde(default)]
    pub round_limit: Option<u32>,
    /// Seed for customer generation.
    #[serde(default)]
    pub seed: u64,
}

impl Default for SessionFile {
    fn default() -> Self {
        let config = SessionConfig::default();
        Self {
            players: config.player_count,
            customers: config.customer_count,
            map: (config.map_width, config.map_height),
            round_limit: config.round_limit,
            seed: 0,
        }
    }
}

impl SessionFile {
    /// Load a session from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SessionFileError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SessionFileError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, SessionFileError> {
        let session: SessionFile = ron::from_str(ron)?;
        session.config().validate()?;
        Ok(session)
    }

    /// The engine configuration described by this file.
    #[must_use]
    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            player_count: self.players,
            customer_count: self.customers,
            map_width: self.map.0,
            map_height: self.map.1,
            round_limit: self.round_limit,
        }
    }
}
