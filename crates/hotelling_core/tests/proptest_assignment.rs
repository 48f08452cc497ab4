//! Property-based tests for assignment and scoring.

use std::collections::BTreeMap;

use hotelling_core::assignment::assign_all;
use hotelling_core::components::PlayerId;
use hotelling_core::math::MapPoint;
use hotelling_core::scoring::{compute_round_report, round_winner, Scoreboard};
use hotelling_test_utils::determinism::strategies::{arb_customers, arb_products, arb_totals};
use proptest::prelude::*;

/// Squared distance in raw fixed-point bits, computed independently of
/// the engine.
fn exact_distance_squared(a: MapPoint, b: MapPoint) -> i128 {
    let dx = i128::from(a.x.to_bits()) - i128::from(b.x.to_bits());
    let dy = i128::from(a.y.to_bits()) - i128::from(b.y.to_bits());
    dx * dx + dy * dy
}

proptest! {
    /// With at least one product, every customer is counted exactly once.
    #[test]
    fn prop_counts_sum_to_customers(
        mut products in arb_products(8),
        mut customers in arb_customers(150),
    ) {
        let summary = assign_all(&mut products, &mut customers);

        let total: u32 = products.iter().map(|p| p.assigned_count).sum();
        prop_assert_eq!(total as usize, customers.len());
        prop_assert_eq!(summary.assigned as usize, customers.len());
        prop_assert!(!summary.degenerate);
    }

    /// The chosen product is a nearest one, and the earliest among equals.
    #[test]
    fn prop_assignment_is_nearest_first_on_ties(
        mut products in arb_products(8),
        mut customers in arb_customers(60),
    ) {
        assign_all(&mut products, &mut customers);

        for customer in &customers {
            let owner = customer.assigned.expect("customer must be assigned");
            let chosen = products.iter().position(|p| p.owner == owner).unwrap();
            let chosen_dist = exact_distance_squared(products[chosen].position, customer.preference);

            for (idx, product) in products.iter().enumerate() {
                let dist = exact_distance_squared(product.position, customer.preference);
                prop_assert!(dist >= chosen_dist);
                if idx < chosen {
                    prop_assert!(dist > chosen_dist, "earlier equidistant product skipped");
                }
            }
        }
    }

    /// Each product's count matches the customers pointing at it.
    #[test]
    fn prop_counts_match_customer_choices(
        mut products in arb_products(6),
        mut customers in arb_customers(100),
    ) {
        assign_all(&mut products, &mut customers);

        for product in &products {
            let pointing = customers
                .iter()
                .filter(|c| c.assigned == Some(product.owner))
                .count();
            prop_assert_eq!(pointing, product.assigned_count as usize);
        }
    }

    /// No products: nobody is assigned and nothing panics.
    #[test]
    fn prop_no_products_all_unassigned(mut customers in arb_customers(80)) {
        let summary = assign_all(&mut [], &mut customers);

        prop_assert!(summary.degenerate);
        prop_assert_eq!(summary.unassigned as usize, customers.len());
        prop_assert!(customers.iter().all(|c| c.assigned.is_none()));
    }

    /// A winner exists exactly when the top total is unique.
    #[test]
    fn prop_winner_iff_unique_top(totals in arb_totals(6)) {
        let map: BTreeMap<PlayerId, u32> = totals
            .iter()
            .enumerate()
            .map(|(idx, &t)| (PlayerId(idx as u32), t))
            .collect();
        let top = *totals.iter().max().unwrap();
        let at_top = totals.iter().filter(|&&t| t == top).count();

        match round_winner(&map) {
            Some(winner) => {
                prop_assert_eq!(at_top, 1);
                prop_assert_eq!(totals[winner.index() as usize], top);
            }
            None => prop_assert!(at_top > 1),
        }
    }

    /// Scores never go down and grow by at most one per round.
    #[test]
    fn prop_scoreboard_monotonic(
        rounds in proptest::collection::vec((arb_products(4), arb_customers(40)), 1..8),
    ) {
        let mut board = Scoreboard::new(4);

        for (round, (mut products, mut customers)) in rounds.into_iter().enumerate() {
            let before = board.scores().to_vec();
            let summary = assign_all(&mut products, &mut customers);
            let report = compute_round_report(round as u32 + 1, 4, &products, summary);
            board.record(&report);

            let after = board.scores();
            for (b, a) in before.iter().zip(after) {
                prop_assert!(a >= b);
            }
            let gained = after.iter().sum::<u32>() - before.iter().sum::<u32>();
            prop_assert!(gained <= 1);
        }
    }
}
