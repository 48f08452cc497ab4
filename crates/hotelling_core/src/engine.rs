//! Engine facade: the single entry point for presentation layers.
//!
//! The [`Engine`] owns every piece of session state: configuration,
//! the round's products and customers, the phase machine, the scoreboard
//! and the random source used for customers. Callers drive it with plain
//! method calls and render whatever [`Outcome`] comes back; the engine
//! never draws, formats for display, or registers callbacks.
//!
//! # Example
//!
//! ```
//! use hotelling_core::prelude::*;
//!
//! let mut engine = Engine::from_seed(SessionConfig::new(2, 50), 42).unwrap();
//!
//! engine.place_active_product(MapPoint::from_f64(2.0, 5.0).unwrap()).unwrap();
//! engine.confirm_placement().unwrap();
//! engine.place_active_product(MapPoint::from_f64(8.0, 5.0).unwrap()).unwrap();
//! let outcome = engine.confirm_placement().unwrap();
//!
//! assert_eq!(outcome.phase, Phase::Results);
//! let report = engine.last_report().unwrap();
//! assert_eq!(report.per_player_totals.values().sum::<u32>(), 50);
//!
//! engine.advance_from_results().unwrap();
//! assert_eq!(engine.phase(), Phase::Placing);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::assignment::assign_all;
use crate::components::PlayerId;
use crate::config::SessionConfig;
use crate::error::{EngineError, Result};
use crate::math::MapPoint;
use crate::registry::EntityRegistry;
use crate::round::{Confirmation, Phase, RoundState};
use crate::scoring::{compute_round_report, RoundReport, Scoreboard};

/// What an engine call did, for the presentation layer to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A product was placed (or moved).
    ProductPlaced {
        /// Owner of the product.
        player: PlayerId,
        /// Where it now sits.
        position: MapPoint,
        /// Whether an earlier product of the same owner was replaced.
        replaced: bool,
    },
    /// It is `player`'s turn to place.
    AwaitingPlacement {
        /// The active player.
        player: PlayerId,
    },
    /// The round was assigned and scored.
    RoundComplete(RoundReport),
    /// Scores and the round were cleared.
    SessionReset,
    /// The engine is in the administrative setup phase.
    SetupEntered,
}

/// Result of a successful engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Phase after the call.
    pub phase: Phase,
    /// Active player after the call.
    pub active_player: PlayerId,
    /// What happened.
    pub event: EngineEvent,
}

/// A game session.
///
/// Generic over the random source so tests and replays can supply a
/// seeded generator.
#[derive(Debug, Clone)]
pub struct Engine<R = StdRng> {
    config: SessionConfig,
    registry: EntityRegistry,
    state: RoundState,
    scoreboard: Scoreboard,
    last_report: Option<RoundReport>,
    rng: R,
}

impl Engine<StdRng> {
    /// Create a session whose customers come from a `StdRng` seeded with `seed`.
    pub fn from_seed(config: SessionConfig, seed: u64) -> Result<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    /// Create a session in `Placing` with the first player active.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] if `config` fails validation.
    pub fn new(config: SessionConfig, rng: R) -> Result<Self> {
        config.validate()?;
        debug!(
            players = config.player_count,
            customers = config.customer_count,
            width = config.map_width,
            height = config.map_height,
            "session started"
        );
        Ok(Self {
            state: RoundState::new(config.player_count),
            scoreboard: Scoreboard::new(config.player_count),
            registry: EntityRegistry::new(),
            last_report: None,
            config,
            rng,
        })
    }

    /// Place (or move) `player`'s product.
    ///
    /// # Errors
    ///
    /// Rejected without changing anything when not in `Placing`, when the
    /// player is unknown, or when `position` is off the map.
    pub fn place_product(&mut self, player: PlayerId, position: MapPoint) -> Result<Outcome> {
        logged(self.try_place(player, position))
    }

    /// Place (or move) the active player's product.
    pub fn place_active_product(&mut self, position: MapPoint) -> Result<Outcome> {
        self.place_product(self.state.active_player(), position)
    }

    /// The active player confirms their placement.
    ///
    /// After the last player confirms, the whole assignment phase runs
    /// before this returns: a fresh customer batch is drawn, every
    /// customer is assigned, the round is scored and the engine lands in
    /// `Results` (or `GameOver` at the round limit).
    pub fn confirm_placement(&mut self) -> Result<Outcome> {
        match logged(self.state.confirm())? {
            Confirmation::NextPlayer(player) => {
                Ok(self.outcome(EngineEvent::AwaitingPlacement { player }))
            }
            Confirmation::AllPlaced => {
                let report = self.run_assignment()?;
                Ok(self.outcome(EngineEvent::RoundComplete(report)))
            }
        }
    }

    /// Start the next round from `Results`.
    ///
    /// Products and customers are cleared and the first player places.
    /// Scores carry over.
    pub fn advance_from_results(&mut self) -> Result<Outcome> {
        logged(self.state.next_round())?;
        self.registry.clear_round();
        Ok(self.outcome(EngineEvent::AwaitingPlacement {
            player: self.state.active_player(),
        }))
    }

    /// Start a new game: scores, round counter and board all cleared.
    ///
    /// Legal in every phase.
    pub fn reset(&mut self) -> Outcome {
        self.registry.clear_round();
        self.scoreboard.clear();
        self.state.reset();
        self.last_report = None;
        debug!("session reset");
        self.outcome(EngineEvent::SessionReset)
    }

    /// Enter the administrative `Setup` phase, clearing the round.
    pub fn enter_setup(&mut self) -> Result<Outcome> {
        logged(self.state.enter_setup())?;
        self.registry.clear_round();
        Ok(self.outcome(EngineEvent::SetupEntered))
    }

    /// Leave `Setup` for the first player's placement.
    pub fn begin(&mut self) -> Result<Outcome> {
        logged(self.state.begin())?;
        Ok(self.outcome(EngineEvent::AwaitingPlacement {
            player: self.state.active_player(),
        }))
    }

    fn try_place(&mut self, player: PlayerId, position: MapPoint) -> Result<Outcome> {
        self.state.require("place a product", Phase::Placing)?;

        let (width, height) = (self.config.width(), self.config.height());
        if !position.is_within(width, height) {
            let (x, y) = position.to_f64();
            return Err(EngineError::PositionOutOfBounds {
                x,
                y,
                width: self.config.map_width,
                height: self.config.map_height,
            });
        }

        let placement = self
            .registry
            .place_product(player, position, self.config.player_count)?;
        debug!(%player, %position, "product placed");

        Ok(self.outcome(EngineEvent::ProductPlaced {
            player,
            position: placement.product.position,
            replaced: placement.replaced.is_some(),
        }))
    }

    fn run_assignment(&mut self) -> Result<RoundReport> {
        self.registry.generate_customers(
            self.config.customer_count,
            self.config.width(),
            self.config.height(),
            &mut self.rng,
        );

        let (products, customers) = self.registry.split_mut();
        let summary = assign_all(products, customers);

        let round = self.state.completed_rounds() + 1;
        let report = compute_round_report(
            round,
            self.config.player_count,
            self.registry.products(),
            summary,
        );
        self.scoreboard.record(&report);
        self.state.finish_assignment(self.config.round_limit)?;

        self.last_report = Some(report.clone());
        Ok(report)
    }

    fn outcome(&self, event: EngineEvent) -> Outcome {
        Outcome {
            phase: self.state.phase(),
            active_player: self.state.active_player(),
            event,
        }
    }
}

impl<R> Engine<R> {
    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Player whose turn it is to place.
    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.state.active_player()
    }

    /// Rounds finished since the session started or was reset.
    #[must_use]
    pub fn completed_rounds(&self) -> u32 {
        self.state.completed_rounds()
    }

    /// Cumulative rounds won per player.
    #[must_use]
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Products and customers of the current round.
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Report of the most recent round, kept until the next one finishes.
    #[must_use]
    pub fn last_report(&self) -> Option<&RoundReport> {
        self.last_report.as_ref()
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Overall winner once the round limit is reached.
    ///
    /// `None` before `GameOver`, or if the top score is shared.
    #[must_use]
    pub fn session_winner(&self) -> Option<PlayerId> {
        if self.state.phase() == Phase::GameOver {
            self.scoreboard.leader()
        } else {
            None
        }
    }

    /// Calculate a hash of the current session state.
    ///
    /// Two engines with the same config, seed and call sequence produce
    /// identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.state.phase().hash(&mut hasher);
        self.state.active_player().hash(&mut hasher);
        self.state.completed_rounds().hash(&mut hasher);
        self.scoreboard.scores().hash(&mut hasher);

        let products = self.registry.products();
        products.len().hash(&mut hasher);
        for product in products {
            product.owner.hash(&mut hasher);
            product.position.hash(&mut hasher);
            product.assigned_count.hash(&mut hasher);
        }

        let customers = self.registry.customers();
        customers.len().hash(&mut hasher);
        for customer in customers {
            customer.preference.hash(&mut hasher);
            customer.assigned.hash(&mut hasher);
        }

        hasher.finish()
    }
}

fn logged<T>(result: Result<T>) -> Result<T> {
    if let Err(ref err) = result {
        warn!(%err, "request rejected");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;

    fn pt(x: i32, y: i32) -> MapPoint {
        MapPoint::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    fn engine(players: u32, customers: u32) -> Engine {
        Engine::from_seed(SessionConfig::new(players, customers), 42).unwrap()
    }

    #[test]
    fn test_new_engine_starts_placing() {
        let engine = engine(2, 10);
        assert_eq!(engine.phase(), Phase::Placing);
        assert_eq!(engine.active_player(), PlayerId(0));
        assert_eq!(engine.scoreboard().scores(), &[0, 0]);
        assert!(engine.last_report().is_none());
    }

    #[test]
    fn test_bad_config_rejected() {
        let err = Engine::from_seed(SessionConfig::new(0, 10), 1).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_place_reports_replacement() {
        let mut engine = engine(2, 10);

        let first = engine.place_active_product(pt(1, 1)).unwrap();
        assert_eq!(
            first.event,
            EngineEvent::ProductPlaced {
                player: PlayerId(0),
                position: pt(1, 1),
                replaced: false
            }
        );

        let second = engine.place_active_product(pt(2, 2)).unwrap();
        assert!(matches!(
            second.event,
            EngineEvent::ProductPlaced { replaced: true, .. }
        ));
        assert_eq!(engine.registry().product_count(), 1);
    }

    #[test]
    fn test_place_off_map_rejected() {
        let mut engine = engine(2, 10);
        let err = engine.place_active_product(pt(11, 3)).unwrap_err();

        assert!(matches!(err, EngineError::PositionOutOfBounds { .. }));
        assert!(err.is_rejection());
        assert_eq!(engine.registry().product_count(), 0);
    }

    #[test]
    fn test_place_unknown_player_rejected() {
        let mut engine = engine(2, 10);
        let err = engine.place_product(PlayerId(5), pt(1, 1)).unwrap_err();
        assert!(matches!(err, EngineError::UnknownPlayer { player: 5, .. }));
    }

    #[test]
    fn test_full_round() {
        let mut engine = engine(2, 30);
        engine.place_active_product(pt(2, 2)).unwrap();
        let outcome = engine.confirm_placement().unwrap();
        assert_eq!(
            outcome.event,
            EngineEvent::AwaitingPlacement {
                player: PlayerId(1)
            }
        );

        engine.place_active_product(pt(8, 8)).unwrap();
        let outcome = engine.confirm_placement().unwrap();

        assert_eq!(outcome.phase, Phase::Results);
        let EngineEvent::RoundComplete(report) = outcome.event else {
            panic!("expected round report");
        };
        assert_eq!(report.round, 1);
        assert_eq!(report.per_player_totals.values().sum::<u32>(), 30);
        assert_eq!(engine.registry().customer_count(), 30);
        assert_eq!(engine.last_report(), Some(&report));

        let total_score: u32 = engine.scoreboard().scores().iter().sum();
        assert_eq!(total_score, u32::from(report.winner.is_some()));
    }

    #[test]
    fn test_confirm_without_products_is_degenerate() {
        let mut engine = engine(2, 12);
        engine.confirm_placement().unwrap();
        let outcome = engine.confirm_placement().unwrap();

        let EngineEvent::RoundComplete(report) = outcome.event else {
            panic!("expected round report");
        };
        assert!(report.degenerate);
        assert_eq!(report.unassigned_customers, 12);
        assert_eq!(report.winner, None);
        assert_eq!(engine.registry().unassigned_count(), 12);
    }

    #[test]
    fn test_place_in_results_rejected() {
        let mut engine = engine(1, 5);
        engine.place_active_product(pt(5, 5)).unwrap();
        engine.confirm_placement().unwrap();
        let hash = engine.state_hash();

        let err = engine.place_product(PlayerId(0), pt(1, 1)).unwrap_err();

        assert_eq!(
            err,
            EngineError::InvalidStateOperation {
                operation: "place a product",
                phase: Phase::Results
            }
        );
        assert_eq!(engine.registry().product_for(PlayerId(0)).unwrap().position, pt(5, 5));
        assert_eq!(engine.state_hash(), hash);
    }

    #[test]
    fn test_advance_clears_round_keeps_scores() {
        let mut engine = engine(1, 5);
        engine.place_active_product(pt(5, 5)).unwrap();
        engine.confirm_placement().unwrap();
        assert_eq!(engine.scoreboard().score(PlayerId(0)), 1);

        let outcome = engine.advance_from_results().unwrap();

        assert_eq!(outcome.phase, Phase::Placing);
        assert!(engine.registry().is_empty());
        assert_eq!(engine.scoreboard().score(PlayerId(0)), 1);
        assert!(engine.last_report().is_some());
    }

    #[test]
    fn test_advance_outside_results_rejected() {
        let mut engine = engine(2, 5);
        assert!(engine.advance_from_results().is_err());
        assert_eq!(engine.phase(), Phase::Placing);
    }

    #[test]
    fn test_round_limit_and_session_winner() {
        let config = SessionConfig::new(1, 3).with_round_limit(2);
        let mut engine = Engine::from_seed(config, 9).unwrap();

        engine.place_active_product(pt(1, 1)).unwrap();
        engine.confirm_placement().unwrap();
        assert_eq!(engine.session_winner(), None);
        engine.advance_from_results().unwrap();
        engine.place_active_product(pt(1, 1)).unwrap();
        let outcome = engine.confirm_placement().unwrap();

        assert_eq!(outcome.phase, Phase::GameOver);
        assert!(matches!(outcome.event, EngineEvent::RoundComplete(ref r) if r.round == 2));
        assert_eq!(engine.session_winner(), Some(PlayerId(0)));
        assert!(engine.advance_from_results().is_err());

        let outcome = engine.reset();
        assert_eq!(outcome.phase, Phase::Placing);
        assert_eq!(engine.scoreboard().score(PlayerId(0)), 0);
        assert_eq!(engine.completed_rounds(), 0);
    }

    #[test]
    fn test_setup_phase() {
        let mut engine = engine(2, 5);
        engine.place_active_product(pt(1, 1)).unwrap();

        let outcome = engine.enter_setup().unwrap();
        assert_eq!(outcome.event, EngineEvent::SetupEntered);
        assert!(engine.registry().is_empty());
        assert!(engine.place_active_product(pt(1, 1)).is_err());

        let outcome = engine.begin().unwrap();
        assert_eq!(outcome.phase, Phase::Placing);
    }

    #[test]
    fn test_same_seed_same_hash() {
        let play = |seed| {
            let mut engine = Engine::from_seed(SessionConfig::new(2, 40), seed).unwrap();
            engine.place_active_product(pt(3, 4)).unwrap();
            engine.confirm_placement().unwrap();
            engine.place_active_product(pt(6, 7)).unwrap();
            engine.confirm_placement().unwrap();
            engine.state_hash()
        };

        assert_eq!(play(5), play(5));
        assert_ne!(play(5), play(6));
    }
}
