//! Test fixtures and helpers.
//!
//! Pre-built configurations, seeded random sources and scripted rounds
//! for consistent testing.

use fixed::types::I32F32;
use hotelling_core::components::PlayerId;
use hotelling_core::config::SessionConfig;
use hotelling_core::engine::{Engine, EngineEvent};
use hotelling_core::error::Result;
use hotelling_core::math::MapPoint;
use hotelling_core::scoring::RoundReport;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a map point from integer coordinates.
#[must_use]
pub fn point(x: i32, y: i32) -> MapPoint {
    MapPoint::new(fixed(x), fixed(y))
}

/// Create a map point from float coordinates (for tests only).
///
/// # Panics
///
/// Panics on NaN or out-of-range input.
#[must_use]
pub fn point_f(x: f64, y: f64) -> MapPoint {
    MapPoint::from_f64(x, y).expect("test point must be representable")
}

/// A seeded `StdRng` so customer batches are reproducible.
#[must_use]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Two players, 50 customers, 10x10 map.
#[must_use]
pub fn two_player_config() -> SessionConfig {
    SessionConfig::default()
}

/// An engine for `config` seeded with `seed`.
///
/// # Panics
///
/// Panics if `config` is invalid.
#[must_use]
pub fn engine_with_seed(config: SessionConfig, seed: u64) -> Engine {
    Engine::from_seed(config, seed).expect("fixture config must be valid")
}

/// Play one full round: each player in turn places at the matching point
/// (or skips placing when it is `None`) and confirms.
///
/// Returns the round report produced by the final confirmation.
///
/// # Errors
///
/// Propagates the first rejected engine call.
///
/// # Panics
///
/// Panics if the final confirmation does not complete the round, which
/// means `placements` has fewer entries than the session has players.
pub fn play_round(engine: &mut Engine, placements: &[Option<MapPoint>]) -> Result<RoundReport> {
    let mut last = None;
    for placement in placements {
        if let Some(position) = placement {
            engine.place_active_product(*position)?;
        }
        last = Some(engine.confirm_placement()?);
    }

    match last.map(|outcome| outcome.event) {
        Some(EngineEvent::RoundComplete(report)) => Ok(report),
        other => panic!("round did not complete, last event: {other:?}"),
    }
}

/// Placements for every player, all present.
#[must_use]
pub fn placements(points: &[MapPoint]) -> Vec<Option<MapPoint>> {
    points.iter().copied().map(Some).collect()
}

/// Convenience: player id from an index.
#[must_use]
pub const fn player(index: u32) -> PlayerId {
    PlayerId(index)
}
