//! One-list share sensitivity sweep
//!
//! For every list and every delta, the list's base share is moved by `delta`
//! and all other lists are rescaled proportionally so the shares still sum to
//! one. Each perturbed vector is simulated with its own seed offset and the
//! list's expected seats are compared with an unperturbed baseline run.

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::{expected_seats, seat_probabilities};
use crate::config::ForecastConfig;
use crate::error::SimulationError;
use crate::simulation::simulate_election;

/// Default perturbations: ±1, ±2 and ±3 percentage points
pub const DEFAULT_SENSITIVITY_DELTAS: [f64; 6] = [-0.03, -0.02, -0.01, 0.01, 0.02, 0.03];

/// Seed offset of the unperturbed baseline run
const BASELINE_SEED_OFFSET: u64 = 1000;

/// Expected-seat response of one list to one share perturbation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRow {
    pub list: String,
    /// Perturbation in percentage points
    pub delta_pp: f64,
    pub expected_seats: f64,
    /// Change in expected seats relative to the baseline run
    pub delta_expected: f64,
}

/// Move `shares[target]` by `delta`, rescaling every other share.
///
/// Returns `None` when the new share would leave (0, 1) or when the other
/// lists hold no share to rescale.
pub fn adjust_shares(shares: &[f64], target: usize, delta: f64) -> Option<Vec<f64>> {
    let adjusted_target = shares[target] + delta;
    if adjusted_target <= 0.0 || adjusted_target >= 1.0 {
        return None;
    }
    let other_total = 1.0 - shares[target];
    if other_total <= 0.0 {
        return None;
    }
    let scale = (1.0 - adjusted_target) / other_total;

    Some(
        shares
            .iter()
            .enumerate()
            .map(|(i, share)| {
                if i == target {
                    adjusted_target
                } else {
                    share * scale
                }
            })
            .collect(),
    )
}

/// Seed offset for the (list, delta) perturbation
fn perturbation_seed_offset(index: usize, delta: f64) -> u64 {
    // |delta| < 1 for any perturbation that survives `adjust_shares`
    let offset = 2000 + 100 * index as i64 + (delta * 1000.0) as i64;
    offset.max(0) as u64
}

fn evaluate_perturbation(
    config: &ForecastConfig,
    baseline: &BTreeMap<String, f64>,
    index: usize,
    delta: f64,
    shares: &[f64],
) -> Result<SensitivityRow, SimulationError> {
    let lists = config.lists();
    let name = &lists[index];
    let outcomes = simulate_election(
        config,
        shares,
        config.sensitivity_sims(),
        perturbation_seed_offset(index, delta),
    )?;
    let expected = expected_seats(&seat_probabilities(&outcomes, lists, config.seats()))[name];
    Ok(SensitivityRow {
        list: name.clone(),
        delta_pp: delta * 100.0,
        expected_seats: expected,
        delta_expected: expected - baseline[name],
    })
}

/// Run the sensitivity sweep with `config.sensitivity_sims()` trials per run.
///
/// Rows are ordered by list (configuration order), then by `deltas` order.
/// Perturbations pushing a share outside (0, 1) are skipped without affecting
/// any other row.
pub fn sensitivity_table(
    config: &ForecastConfig,
    deltas: &[f64],
) -> Result<Vec<SensitivityRow>, SimulationError> {
    let trials = config.sensitivity_sims();
    let lists = config.lists();
    let base_shares = config.base_shares();

    let baseline_outcomes =
        simulate_election(config, base_shares, trials, BASELINE_SEED_OFFSET)?;
    let baseline = expected_seats(&seat_probabilities(
        &baseline_outcomes,
        lists,
        config.seats(),
    ));

    let perturbations: Vec<(usize, f64, Vec<f64>)> = (0..lists.len())
        .flat_map(|index| deltas.iter().map(move |&delta| (index, delta)))
        .filter_map(|(index, delta)| {
            adjust_shares(base_shares, index, delta).map(|shares| (index, delta, shares))
        })
        .collect();

    let evaluate = |(index, delta, shares): (usize, f64, Vec<f64>)| {
        evaluate_perturbation(config, &baseline, index, delta, &shares)
    };

    #[cfg(feature = "parallel")]
    let rows = perturbations.into_par_iter().map(evaluate).collect();

    #[cfg(not(feature = "parallel"))]
    let rows = perturbations.into_iter().map(evaluate).collect();

    rows
}
