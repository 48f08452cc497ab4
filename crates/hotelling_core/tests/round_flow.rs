//! Round flow tests.
//!
//! Drives whole rounds through the engine facade the way a presentation
//! layer would.

use hotelling_core::prelude::*;
use hotelling_test_utils::fixtures::{
    engine_with_seed, placements, play_round, player, point, two_player_config,
};

#[test]
fn two_confirms_run_assignment_and_land_in_results() {
    let mut engine = engine_with_seed(two_player_config(), 11);

    engine.place_active_product(point(2, 5)).unwrap();
    let first = engine.confirm_placement().unwrap();
    assert_eq!(first.phase, Phase::Placing);
    assert_eq!(first.active_player, player(1));

    engine.place_active_product(point(8, 5)).unwrap();
    let second = engine.confirm_placement().unwrap();

    // Assignment is never observable from outside.
    assert_eq!(second.phase, Phase::Results);
    assert!(matches!(second.event, EngineEvent::RoundComplete(_)));
}

#[test]
fn next_round_clears_board_and_resets_active_player() {
    let mut engine = engine_with_seed(two_player_config(), 11);
    play_round(&mut engine, &placements(&[point(2, 5), point(8, 5)])).unwrap();
    assert_eq!(engine.registry().customer_count(), 50);

    let outcome = engine.advance_from_results().unwrap();

    assert_eq!(outcome.phase, Phase::Placing);
    assert_eq!(outcome.active_player, player(0));
    assert_eq!(
        outcome.event,
        EngineEvent::AwaitingPlacement { player: player(0) }
    );
    assert_eq!(engine.registry().product_count(), 0);
    assert_eq!(engine.registry().customer_count(), 0);
}

#[test]
fn placing_during_results_is_rejected_without_mutation() {
    let mut engine = engine_with_seed(two_player_config(), 3);
    play_round(&mut engine, &placements(&[point(1, 1), point(9, 9)])).unwrap();
    let products_before = engine.registry().products().to_vec();

    let err = engine.place_product(player(0), point(5, 5)).unwrap_err();

    assert!(matches!(
        err,
        EngineError::InvalidStateOperation {
            phase: Phase::Results,
            ..
        }
    ));
    assert!(err.is_rejection());
    assert_eq!(engine.registry().products(), products_before.as_slice());
    assert_eq!(engine.phase(), Phase::Results);
}

#[test]
fn replacing_a_product_keeps_only_the_latest() {
    let mut engine = engine_with_seed(two_player_config(), 3);

    engine.place_product(player(0), point(1, 1)).unwrap();
    engine.place_product(player(0), point(6, 2)).unwrap();

    let owned: Vec<_> = engine
        .registry()
        .products()
        .iter()
        .filter(|p| p.owner == player(0))
        .collect();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].position, point(6, 2));
}

#[test]
fn every_customer_is_counted_once() {
    let config = SessionConfig::new(4, 333).with_map(100.0, 60.0);
    let mut engine = engine_with_seed(config, 2024);

    let report = play_round(
        &mut engine,
        &placements(&[point(10, 10), point(90, 10), point(10, 50), point(50, 30)]),
    )
    .unwrap();

    let counted: u32 = report.products.iter().map(|p| p.customers).sum();
    assert_eq!(counted, 333);
    assert_eq!(report.unassigned_customers, 0);
    assert!(engine.registry().customers().iter().all(Customer::is_assigned));
}

#[test]
fn customers_are_redrawn_each_round() {
    let mut engine = engine_with_seed(two_player_config(), 8);
    let places = placements(&[point(3, 3), point(7, 7)]);

    play_round(&mut engine, &places).unwrap();
    let first: Vec<_> = engine.registry().customers().to_vec();
    engine.advance_from_results().unwrap();
    play_round(&mut engine, &places).unwrap();
    let second: Vec<_> = engine.registry().customers().to_vec();

    assert_eq!(first.len(), second.len());
    assert_ne!(first, second);
}

#[test]
fn scores_only_grow_until_reset() {
    let mut engine = engine_with_seed(two_player_config(), 99);
    // Player 1 sits in a corner, player 2 in the middle and should win most rounds.
    let places = placements(&[point(0, 0), point(5, 5)]);
    let mut previous = engine.scoreboard().scores().to_vec();

    for round in 1..=6 {
        let report = play_round(&mut engine, &places).unwrap();
        assert_eq!(report.round, round);

        let now = engine.scoreboard().scores().to_vec();
        for (before, after) in previous.iter().zip(&now) {
            assert!(after >= before);
        }
        let gained: u32 = now.iter().sum::<u32>() - previous.iter().sum::<u32>();
        assert_eq!(gained, u32::from(report.winner.is_some()));
        previous = now;

        engine.advance_from_results().unwrap();
    }

    assert!(engine.scoreboard().score(player(1)) > engine.scoreboard().score(player(0)));

    engine.reset();
    assert_eq!(engine.scoreboard().scores(), &[0, 0]);
}

#[test]
fn round_without_products_leaves_customers_unassigned() {
    let mut engine = engine_with_seed(two_player_config(), 1);

    let report = play_round(&mut engine, &[None, None]).unwrap();

    assert!(report.degenerate);
    assert_eq!(report.winner, None);
    assert_eq!(report.unassigned_customers, 50);
    assert_eq!(engine.scoreboard().scores(), &[0, 0]);
}

#[test]
fn absent_player_loses_to_present_player() {
    let mut engine = engine_with_seed(two_player_config(), 1);

    let report = play_round(&mut engine, &[Some(point(5, 5)), None]).unwrap();

    assert_eq!(report.total_for(player(0)), 50);
    assert_eq!(report.total_for(player(1)), 0);
    assert_eq!(report.winner, Some(player(0)));
    assert_eq!(engine.scoreboard().score(player(0)), 1);
}

#[test]
fn absent_player_ties_when_no_customers_exist() {
    let mut engine = engine_with_seed(SessionConfig::new(2, 0), 1);

    let report = play_round(&mut engine, &[Some(point(5, 5)), None]).unwrap();

    assert_eq!(report.per_player_totals.len(), 2);
    assert_eq!(report.total_for(player(0)), 0);
    assert_eq!(report.total_for(player(1)), 0);
    assert_eq!(report.winner, None);
    assert_eq!(engine.scoreboard().scores(), &[0, 0]);
}

#[test]
fn round_limit_reaches_game_over() {
    let config = two_player_config().with_round_limit(3);
    let mut engine = engine_with_seed(config, 4);
    let places = placements(&[point(1, 1), point(5, 5)]);

    for _ in 0..2 {
        play_round(&mut engine, &places).unwrap();
        assert_eq!(engine.phase(), Phase::Results);
        engine.advance_from_results().unwrap();
    }
    play_round(&mut engine, &places).unwrap();

    assert_eq!(engine.phase(), Phase::GameOver);
    assert!(engine.place_active_product(point(1, 1)).is_err());
    assert!(engine.confirm_placement().is_err());

    engine.reset();
    assert_eq!(engine.phase(), Phase::Placing);
    assert_eq!(engine.completed_rounds(), 0);
}
