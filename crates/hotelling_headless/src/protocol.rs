//! JSON protocol for headless session control.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Engine outcomes and state
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready",...}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers every command with one response
//! 4. On `quit` (or end of input), outputs `{"type":"bye"}`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","players":2,"customers":50,"map_width":10.0,"map_height":10.0}
//! -> {"cmd":"place","x":2.5,"y":5.0}
//! <- {"type":"placed","player":0,"x":2.5,"y":5.0,"replaced":false}
//! -> {"cmd":"confirm"}
//! <- {"type":"awaiting","player":1}
//! -> {"cmd":"place","x":7.5,"y":5.0}
//! <- {"type":"placed","player":1,"x":7.5,"y":5.0,"replaced":false}
//! -> {"cmd":"confirm"}
//! <- {"type":"round_complete","phase":"results","report":{...},"scores":[1,0]}
//! -> {"cmd":"next_round"}
//! <- {"type":"awaiting","player":0}
//! ```

use std::collections::BTreeMap;

use hotelling_core::engine::{EngineEvent, Outcome};
use hotelling_core::round::Phase;
use hotelling_core::scoring::RoundReport;
use serde::{Deserialize, Serialize};

/// Protocol version reported in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Place a product; defaults to the active player.
    Place {
        #[serde(default)]
        player: Option<u32>,
        x: f64,
        y: f64,
    },

    /// Active player confirms their placement.
    Confirm,

    /// Leave the results screen for the next round.
    NextRound,

    /// Start a new game with cleared scores.
    Reset,

    /// Enter the administrative setup phase.
    Setup,

    /// Leave setup and start placing.
    Begin,

    /// Query current session state.
    Query,

    /// Report the session state hash (for determinism verification).
    Hash,

    /// Quit the runner.
    Quit,
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        version: String,
        players: u32,
        customers: u32,
        map_width: f64,
        map_height: f64,
    },

    /// A product was placed.
    Placed {
        player: u32,
        x: f64,
        y: f64,
        replaced: bool,
    },

    /// Waiting for `player` to place.
    Awaiting { player: u32 },

    /// The round finished.
    RoundComplete {
        phase: Phase,
        report: ReportOutput,
        scores: Vec<u32>,
    },

    /// Scores and board cleared.
    Reset,

    /// Setup phase entered.
    Setup,

    /// Current session state.
    State {
        phase: Phase,
        active_player: u32,
        completed_rounds: u32,
        products: Vec<ProductOutput>,
        customers: usize,
        scores: Vec<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_report: Option<ReportOutput>,
        #[serde(skip_serializing_if = "Option::is_none")]
        session_winner: Option<u32>,
    },

    /// State hash for determinism verification.
    StateHash { hash: u64 },

    /// The engine refused the command; the session continues.
    Rejected { cmd: String, reason: String },

    /// The input line could not be understood.
    Error { message: String },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Types
// ============================================================================

/// A product as shown to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOutput {
    pub player: u32,
    pub x: f64,
    pub y: f64,
    pub customers: u32,
}

/// A round report as shown to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOutput {
    pub round: u32,
    /// Customer totals keyed by player index.
    pub totals: BTreeMap<u32, u32>,
    pub products: Vec<ProductOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<u32>,
    pub unassigned_customers: u32,
    pub degenerate: bool,
}

impl From<&RoundReport> for ReportOutput {
    fn from(report: &RoundReport) -> Self {
        Self {
            round: report.round,
            totals: report
                .per_player_totals
                .iter()
                .map(|(player, &total)| (player.index(), total))
                .collect(),
            products: report
                .products
                .iter()
                .map(|p| {
                    let (x, y) = p.position.to_f64();
                    ProductOutput {
                        player: p.owner.index(),
                        x,
                        y,
                        customers: p.customers,
                    }
                })
                .collect(),
            winner: report.winner.map(|w| w.index()),
            unassigned_customers: report.unassigned_customers,
            degenerate: report.degenerate,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Create a rejection response.
    pub fn rejected(cmd: &str, reason: impl ToString) -> Self {
        Self::Rejected {
            cmd: cmd.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Translate an engine outcome.
    ///
    /// `scores` is the scoreboard after the call.
    pub fn from_outcome(outcome: &Outcome, scores: &[u32]) -> Self {
        match &outcome.event {
            EngineEvent::ProductPlaced {
                player,
                position,
                replaced,
            } => {
                let (x, y) = position.to_f64();
                Self::Placed {
                    player: player.index(),
                    x,
                    y,
                    replaced: *replaced,
                }
            }
            EngineEvent::AwaitingPlacement { player } => Self::Awaiting {
                player: player.index(),
            },
            EngineEvent::RoundComplete(report) => Self::RoundComplete {
                phase: outcome.phase,
                report: ReportOutput::from(report),
                scores: scores.to_vec(),
            },
            EngineEvent::SessionReset => Self::Reset,
            EngineEvent::SetupEntered => Self::Setup,
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"Serialization failed: {}"}}"#,
                e
            )
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for rejections.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Place { .. } => "place",
            Self::Confirm => "confirm",
            Self::NextRound => "next_round",
            Self::Reset => "reset",
            Self::Setup => "setup",
            Self::Begin => "begin",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotelling_core::components::PlayerId;
    use hotelling_core::math::MapPoint;

    #[test]
    fn test_parse_place_command() {
        let cmd = Command::from_json(r#"{"cmd":"place","x":2.5,"y":7.0}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Place {
                player: None,
                x: 2.5,
                y: 7.0
            }
        );
    }

    #[test]
    fn test_parse_place_for_player() {
        let cmd = Command::from_json(r#"{"cmd":"place","player":1,"x":0,"y":0}"#).unwrap();
        assert!(matches!(cmd, Command::Place { player: Some(1), .. }));
    }

    #[test]
    fn test_parse_unit_commands() {
        assert_eq!(Command::from_json(r#"{"cmd":"confirm"}"#).unwrap(), Command::Confirm);
        assert_eq!(
            Command::from_json(r#"{"cmd":"next_round"}"#).unwrap(),
            Command::NextRound
        );
        assert!(Command::from_json(r#"{"cmd":"fly"}"#).is_err());
    }

    #[test]
    fn test_placed_from_outcome() {
        let outcome = Outcome {
            phase: Phase::Placing,
            active_player: PlayerId(0),
            event: EngineEvent::ProductPlaced {
                player: PlayerId(0),
                position: MapPoint::from_f64(1.5, 2.0).unwrap(),
                replaced: true,
            },
        };
        let resp = Response::from_outcome(&outcome, &[0, 0]);
        assert_eq!(
            resp,
            Response::Placed {
                player: 0,
                x: 1.5,
                y: 2.0,
                replaced: true
            }
        );
    }

    #[test]
    fn test_serialize_rejected() {
        let json = Response::rejected("confirm", "Cannot confirm placement during results")
            .to_json_line();
        assert!(json.contains(r#""type":"rejected""#));
        assert!(json.contains(r#""cmd":"confirm""#));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        let json = serde_json::to_string(&Phase::GameOver).unwrap();
        assert_eq!(json, r#""game_over""#);
    }
}
