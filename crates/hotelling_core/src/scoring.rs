//! Round results and cumulative scores.
//!
//! A round is won by the player whose customer total is strictly higher
//! than everyone else's. The winner gets exactly one point regardless of
//! the margin; a tie for first awards nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assignment::AssignmentSummary;
use crate::components::{PlayerId, Product};
use crate::math::MapPoint;

/// One product's line in a round report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResult {
    /// Owning player.
    pub owner: PlayerId,
    /// Product position.
    pub position: MapPoint,
    /// Customers won this round.
    pub customers: u32,
}

/// Read-only summary of a finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round number, starting at 1.
    pub round: u32,
    /// Customer total for every player in the session; zero for players
    /// without a product.
    pub per_player_totals: BTreeMap<PlayerId, u32>,
    /// Per-product detail, ascending by owner.
    pub products: Vec<ProductResult>,
    /// Player with the strictly highest total, `None` on a tie.
    pub winner: Option<PlayerId>,
    /// Customers that got no product.
    pub unassigned_customers: u32,
    /// The round was played with no products.
    pub degenerate: bool,
}

impl RoundReport {
    /// Customer total for `player`, zero if they placed nothing.
    #[must_use]
    pub fn total_for(&self, player: PlayerId) -> u32 {
        self.per_player_totals.get(&player).copied().unwrap_or(0)
    }

    /// Whether the round ended without a winner.
    #[must_use]
    pub const fn is_tie(&self) -> bool {
        self.winner.is_none()
    }
}

/// Build the report for a round from the products after assignment.
///
/// Every player in `0..player_count` appears in the totals, so a player who
/// skipped placing competes with zero customers. A degenerate round has no
/// winner.
#[must_use]
pub fn compute_round_report(
    round: u32,
    player_count: u32,
    products: &[Product],
    summary: AssignmentSummary,
) -> RoundReport {
    let mut per_player_totals: BTreeMap<PlayerId, u32> =
        (0..player_count).map(|idx| (PlayerId(idx), 0)).collect();
    for product in products {
        *per_player_totals.entry(product.owner).or_insert(0) += product.assigned_count;
    }

    let mut details: Vec<ProductResult> = products
        .iter()
        .map(|p| ProductResult {
            owner: p.owner,
            position: p.position,
            customers: p.assigned_count,
        })
        .collect();
    details.sort_by_key(|p| p.owner);

    RoundReport {
        round,
        winner: if summary.degenerate {
            None
        } else {
            round_winner(&per_player_totals)
        },
        per_player_totals,
        products: details,
        unassigned_customers: summary.unassigned,
        degenerate: summary.degenerate,
    }
}

/// The player whose total beats every other player's, if any.
#[must_use]
pub fn round_winner(totals: &BTreeMap<PlayerId, u32>) -> Option<PlayerId> {
    let mut best: Option<(PlayerId, u32)> = None;
    let mut tied = false;

    for (&player, &total) in totals {
        match best {
            Some((_, top)) if total < top => {}
            Some((_, top)) if total == top => tied = true,
            _ => {
                best = Some((player, total));
                tied = false;
            }
        }
    }

    if tied {
        None
    } else {
        best.map(|(player, _)| player)
    }
}

/// Rounds won by each player over a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    scores: Vec<u32>,
}

impl Scoreboard {
    /// A zeroed scoreboard for `player_count` players.
    #[must_use]
    pub fn new(player_count: u32) -> Self {
        Self {
            scores: vec![0; player_count as usize],
        }
    }

    /// Award the round to its winner, if it has one.
    ///
    /// Returns the player credited.
    pub fn record(&mut self, report: &RoundReport) -> Option<PlayerId> {
        let Some(winner) = report.winner else {
            info!(round = report.round, "round is a tie, no score change");
            return None;
        };
        let Some(score) = self.scores.get_mut(winner.index() as usize) else {
            return None;
        };
        *score += 1;
        info!(
            round = report.round,
            %winner,
            customers = report.total_for(winner),
            "round won (+1 score)"
        );
        Some(winner)
    }

    /// Rounds won by `player`.
    #[must_use]
    pub fn score(&self, player: PlayerId) -> u32 {
        self.scores
            .get(player.index() as usize)
            .copied()
            .unwrap_or(0)
    }

    /// All scores, indexed by player.
    #[must_use]
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Player with strictly the most rounds won.
    #[must_use]
    pub fn leader(&self) -> Option<PlayerId> {
        let totals: BTreeMap<PlayerId, u32> = self
            .scores
            .iter()
            .enumerate()
            .map(|(idx, &score)| (PlayerId(idx as u32), score))
            .collect();
        round_winner(&totals)
    }

    /// Zero every score.
    pub fn clear(&mut self) {
        self.scores.iter_mut().for_each(|s| *s = 0);
    }
}
