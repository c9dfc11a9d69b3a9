//! Tests for the simulation engine and its outcome distributions
//!
//! These tests verify that:
//! - Seeded runs are reproducible and offsets select independent streams
//! - Unseeded runs draw fresh randomness
//! - Every simulated allocation conserves the seat count
//! - Probability tables and expected seats are consistent with the seat count
//! - A near-deterministic forecast collapses to a single outcome

use super::three_list_config;
use crate::analysis::{
    allocation_entropy, expected_seats, seat_entropy, seat_probabilities, summarize,
};
use crate::config::ForecastBuilder;
use crate::simulation::{TRIALS_PER_BATCH, simulate_election, simulate_from_config};

#[test]
fn test_seeded_runs_are_identical() {
    let config = three_list_config(Some(42));

    let first = simulate_from_config(&config, 0).unwrap();
    let second = simulate_from_config(&config, 0).unwrap();

    assert_eq!(first, second);
    assert!(first.len() > 1, "expected more than one distinct outcome");
}

#[test]
fn test_seed_offset_changes_stream() {
    let config = three_list_config(Some(42));

    let base = simulate_from_config(&config, 0).unwrap();
    let offset = simulate_from_config(&config, 1000).unwrap();

    assert_ne!(base, offset);
}

#[test]
fn test_unseeded_runs_differ() {
    let config = three_list_config(None);

    let first = simulate_from_config(&config, 0).unwrap();
    let second = simulate_from_config(&config, 0).unwrap();

    assert_ne!(first, second);
}

#[test]
fn test_trial_count_and_seat_conservation() {
    let config = three_list_config(Some(7));
    assert!(config.sims() % TRIALS_PER_BATCH != 0);

    let outcomes = simulate_from_config(&config, 0).unwrap();

    assert_eq!(outcomes.total(), config.sims() as u64);
    for (allocation, count) in outcomes.iter() {
        assert!(count > 0);
        assert_eq!(allocation.seats().len(), config.lists().len());
        assert_eq!(allocation.total(), config.seats());
    }
}

#[test]
fn test_probabilities_and_expected_seats_are_consistent() {
    let config = three_list_config(Some(3));
    let outcomes = simulate_from_config(&config, 0).unwrap();
    let table = seat_probabilities(&outcomes, config.lists(), config.seats());

    for (name, row) in table.iter() {
        assert_eq!(row.len(), config.seats() as usize + 1);
        let total: f64 = row.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "{name} row sums to {total}");
    }

    let expected = expected_seats(&table);
    let seats: f64 = expected.values().sum();
    assert!((seats - f64::from(config.seats())).abs() < 1e-9);
    // the largest list should win the most seats on average
    assert!(expected["A"] > expected["B"]);
    assert!(expected["B"] > expected["C"]);
}

#[test]
fn test_single_trial_run() {
    let config = three_list_config(Some(1));
    let outcomes = simulate_election(&config, config.base_shares(), 1, 0).unwrap();

    assert_eq!(outcomes.total(), 1);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(allocation_entropy(&outcomes), 0.0);
}

#[test]
fn test_tight_forecast_collapses_to_one_outcome() {
    let config = ForecastBuilder::new()
        .list("A", 0.5)
        .list("B", 0.3)
        .list("C", 0.2)
        .seats(6)
        .sims(500)
        .concentration(1e7)
        .swing(0.0, 0.0)
        .seed(99)
        .build()
        .unwrap();

    let outcomes = simulate_from_config(&config, 0).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes.count(&[3, 2, 1]), 500);

    let table = seat_probabilities(&outcomes, config.lists(), config.seats());
    assert_eq!(allocation_entropy(&outcomes), 0.0);
    assert!(seat_entropy(&table).values().all(|h| *h == 0.0));
}

#[test]
fn test_summary_serializes_with_config_echo() {
    let config = three_list_config(Some(5));
    let outcomes = simulate_from_config(&config, 0).unwrap();
    let table = seat_probabilities(&outcomes, config.lists(), config.seats());
    let summary = summarize(&config, &outcomes, &table);

    assert_eq!(summary.lists, config.lists());
    assert!(summary.top_allocations.len() <= 10);
    assert!(summary.allocation_entropy > 0.0);
    for pair in summary.top_allocations.windows(2) {
        assert!(pair[0].count >= pair[1].count);
    }
    for (name, p1) in &summary.prob_ge_1 {
        assert!(*p1 >= summary.prob_ge_2[name]);
    }

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["config"]["seats"], 7);
    assert_eq!(json["config"]["seed"], 5);
    assert!(json["top_allocations"][0]["allocation"]["A"].is_u64());
}

#[test]
fn test_small_concentration_spreads_to_corners() {
    let config = ForecastBuilder::new()
        .list("A", 0.5)
        .list("B", 0.3)
        .list("C", 0.2)
        .seats(6)
        .sims(2000)
        .concentration(1e-3)
        .swing(0.0, 0.0)
        .seed(1)
        .build()
        .unwrap();

    let outcomes = simulate_from_config(&config, 0).unwrap();

    assert_eq!(outcomes.total(), 2000);
    // the mean vote split would give [3, 2, 1]
    assert!(outcomes.count(&[3, 2, 1]) < 20, "{:?}", outcomes.most_common());
    let corners: u64 = [[6u32, 0, 0], [0, 6, 0], [0, 0, 6]]
        .iter()
        .map(|corner| outcomes.count(corner))
        .sum();
    assert!(corners > 1900, "only {corners} corner outcomes");
    assert!(outcomes.count(&[6, 0, 0]) > outcomes.count(&[0, 0, 6]));
}

#[test]
fn test_large_swing_still_produces_a_result() {
    let config = ForecastBuilder::new()
        .list("A", 0.5)
        .list("B", 0.3)
        .list("C", 0.2)
        .seats(6)
        .sims(1500)
        .swing(400.0, 0.0)
        .left_bloc(["A"])
        .seed(1)
        .build()
        .unwrap();

    let outcomes = simulate_from_config(&config, 0).unwrap();

    assert_eq!(outcomes.total(), 1500);
    for (allocation, _) in outcomes.iter() {
        assert_eq!(allocation.total(), 6);
    }
    // one bloc takes every seat in almost every trial
    assert!(outcomes.count(&[6, 0, 0]) > 500);
}
