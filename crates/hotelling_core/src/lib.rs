//! # Hotelling Core
//!
//! Round engine for a market-placement game: players place products on a
//! shared preference map, simulated customers buy from the nearest
//! product, and the player with the most customers wins the round.
//!
//! This crate contains **only** the engine:
//! - No rendering
//! - No IO
//! - No ambient randomness (the customer RNG is injected)
//! - No floating-point map math (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`math`] - Fixed-point map coordinates and distances
//! - [`components`] - Players, products and customers
//! - [`config`] - Validated session configuration
//! - [`registry`] - The round's products and customers
//! - [`assignment`] - Nearest-product customer assignment
//! - [`round`] - Phase state machine
//! - [`scoring`] - Round reports and the session scoreboard
//! - [`engine`] - Facade tying it together

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod assignment;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod math;
pub mod registry;
pub mod round;
pub mod scoring;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::assignment::{assign_all, AssignmentSummary};
    pub use crate::components::{Customer, PlayerId, Product};
    pub use crate::config::SessionConfig;
    pub use crate::engine::{Engine, EngineEvent, Outcome};
    pub use crate::error::{EngineError, Result};
    pub use crate::math::{Fixed, MapPoint, WideFixed};
    pub use crate::registry::EntityRegistry;
    pub use crate::round::Phase;
    pub use crate::scoring::{RoundReport, Scoreboard};
}
