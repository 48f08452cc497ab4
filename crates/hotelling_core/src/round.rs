//! Round phase state machine.
//!
//! ```text
//!            confirm (more players)
//!              ┌─────┐
//!              ▼     │
//! Setup ──► Placing ─┴─ confirm (last) ──► Assignment ──► Results ──► Placing
//!   ▲                                          │  next_round
//!   │ enter_setup                              └──► GameOver ──reset──► Placing
//! ```
//!
//! `Assignment` is entered and left inside a single engine call, so
//! callers never observe it. Every transition method checks the current
//! phase and leaves the machine untouched when the move is illegal.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::PlayerId;
use crate::error::{EngineError, Result};

/// Phase of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Administrative phase; not entered by normal play.
    Setup,
    /// Players take turns placing their products.
    Placing,
    /// Customers are being generated and assigned.
    Assignment,
    /// The round report is available.
    Results,
    /// The round limit was reached.
    GameOver,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::Placing => "placing",
            Self::Assignment => "assignment",
            Self::Results => "results",
            Self::GameOver => "game over",
        };
        f.write_str(name)
    }
}

/// What a placement confirmation led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Another player now places.
    NextPlayer(PlayerId),
    /// Every player has confirmed; the machine is in `Assignment`.
    AllPlaced,
}

/// Tracks the phase, whose turn it is and how many rounds have finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    phase: Phase,
    active_player: PlayerId,
    player_count: u32,
    completed_rounds: u32,
}

impl RoundState {
    /// Start a session in `Placing` with the first player active.
    #[must_use]
    pub const fn new(player_count: u32) -> Self {
        Self {
            phase: Phase::Placing,
            active_player: PlayerId::FIRST,
            player_count,
            completed_rounds: 0,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Player whose turn it is to place.
    #[must_use]
    pub const fn active_player(&self) -> PlayerId {
        self.active_player
    }

    /// Rounds that reached the results phase since the last reset.
    #[must_use]
    pub const fn completed_rounds(&self) -> u32 {
        self.completed_rounds
    }

    /// Fail with [`EngineError::InvalidStateOperation`] unless in `expected`.
    pub fn require(&self, operation: &'static str, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidStateOperation {
                operation,
                phase: self.phase,
            })
        }
    }

    /// The active player confirms their placement.
    pub fn confirm(&mut self) -> Result<Confirmation> {
        self.require("confirm placement", Phase::Placing)?;

        let next = self.active_player.next();
        if next.index() < self.player_count {
            self.active_player = next;
            debug!(player = %next, "next player placing");
            Ok(Confirmation::NextPlayer(next))
        } else {
            self.transition(Phase::Assignment);
            Ok(Confirmation::AllPlaced)
        }
    }

    /// Leave `Assignment`, counting the finished round.
    ///
    /// Lands in `GameOver` once `round_limit` rounds have finished,
    /// otherwise in `Results`.
    pub fn finish_assignment(&mut self, round_limit: Option<u32>) -> Result<Phase> {
        self.require("finish assignment", Phase::Assignment)?;

        self.completed_rounds += 1;
        let next = match round_limit {
            Some(limit) if self.completed_rounds >= limit => Phase::GameOver,
            _ => Phase::Results,
        };
        self.transition(next);
        Ok(next)
    }

    /// `Results → Placing` for the next round.
    pub fn next_round(&mut self) -> Result<()> {
        self.require("start the next round", Phase::Results)?;
        self.active_player = PlayerId::FIRST;
        self.transition(Phase::Placing);
        Ok(())
    }

    /// Enter the administrative `Setup` phase.
    pub fn enter_setup(&mut self) -> Result<()> {
        if self.phase == Phase::Assignment {
            return Err(EngineError::InvalidStateOperation {
                operation: "enter setup",
                phase: self.phase,
            });
        }
        self.active_player = PlayerId::FIRST;
        self.transition(Phase::Setup);
        Ok(())
    }

    /// `Setup → Placing`.
    pub fn begin(&mut self) -> Result<()> {
        self.require("begin placing", Phase::Setup)?;
        self.transition(Phase::Placing);
        Ok(())
    }

    /// Back to the first player's placement with no finished rounds.
    pub fn reset(&mut self) {
        self.active_player = PlayerId::FIRST;
        self.completed_rounds = 0;
        self.transition(Phase::Placing);
    }

    fn transition(&mut self, next: Phase) {
        debug!(from = %self.phase, to = %next, "phase change");
        self.phase = next;
    }
}
