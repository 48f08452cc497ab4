//! Session configuration.
//!
//! Supplied once at session start and immutable until the engine is
//! rebuilt. Values are validated by [`SessionConfig::validate`] before an
//! [`Engine`](crate::engine::Engine) will accept them.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::math::Fixed;

/// Largest accepted map width or height.
///
/// Keeps squared distances across the whole map inside the fixed-point
/// integer range.
pub const MAX_MAP_EXTENT: f64 = 16_384.0;

/// Configuration for one game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of players placing a product each round (at least 1).
    pub player_count: u32,
    /// Customers generated at the start of every assignment phase.
    pub customer_count: u32,
    /// Map width in map units.
    pub map_width: f64,
    /// Map height in map units.
    pub map_height: f64,
    /// Rounds after which the session ends in `GameOver`.
    #[serde(default)]
    pub round_limit: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            customer_count: 50,
            map_width: 10.0,
            map_height: 10.0,
            round_limit: None,
        }
    }
}

impl SessionConfig {
    /// Create a config with the given players and customers on the default map.
    #[must_use]
    pub fn new(player_count: u32, customer_count: u32) -> Self {
        Self {
            player_count,
            customer_count,
            ..Default::default()
        }
    }

    /// Set the map dimensions.
    #[must_use]
    pub const fn with_map(mut self, width: f64, height: f64) -> Self {
        self.map_width = width;
        self.map_height = height;
        self
    }

    /// Set the round limit.
    #[must_use]
    pub const fn with_round_limit(mut self, rounds: u32) -> Self {
        self.round_limit = Some(rounds);
        self
    }

    /// Check every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.player_count == 0 {
            return Err(EngineError::Configuration(
                "player_count must be at least 1".to_string(),
            ));
        }
        check_extent("map_width", self.map_width)?;
        check_extent("map_height", self.map_height)?;
        if self.round_limit == Some(0) {
            return Err(EngineError::Configuration(
                "round_limit must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Map width in fixed point.
    #[must_use]
    pub fn width(&self) -> Fixed {
        Fixed::saturating_from_num(self.map_width)
    }

    /// Map height in fixed point.
    #[must_use]
    pub fn height(&self) -> Fixed {
        Fixed::saturating_from_num(self.map_height)
    }
}

fn check_extent(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::Configuration(format!(
            "{name} must be a positive number, got {value}"
        )));
    }
    if value > MAX_MAP_EXTENT {
        return Err(EngineError::Configuration(format!(
            "{name} must not exceed {MAX_MAP_EXTENT}, got {value}"
        )));
    }
    Ok(())
}
