//! Vote-transfer targeting
//!
//! Ranks the other lists as donors to a beneficiary list: for each donor, a
//! fixed share `delta` is moved directly from the donor to the beneficiary and
//! the beneficiary's expected seats and seat-threshold probabilities are
//! compared with a baseline run.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::{ListMetrics, seat_probabilities};
use crate::config::ForecastConfig;
use crate::error::SimulationError;
use crate::simulation::simulate_election;

/// List the report is written for when none is given
pub const DEFAULT_BENEFICIARY: &str = "PC";

/// Share moved from each donor (one percentage point)
pub const DEFAULT_TRANSFER: f64 = 0.01;

const BASELINE_SEED_OFFSET: u64 = 3000;
const DONOR_SEED_OFFSET: u64 = 4000;

/// Beneficiary gains from a transfer out of one donor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetingRow {
    pub donor: String,
    pub delta_expected: f64,
    pub delta_prob_ge_1: f64,
    pub delta_prob_ge_2: f64,
}

/// Result of a targeting analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TargetingReport {
    /// The beneficiary is not one of the configured lists
    NotApplicable { beneficiary: String },
    Ranked {
        beneficiary: String,
        delta: f64,
        baseline: ListMetrics,
        /// Sorted by descending `delta_expected`
        rows: Vec<TargetingRow>,
    },
}

/// Move `delta` from `donor` to `beneficiary`.
///
/// `None` if the two are the same list or the donor holds no more than `delta`.
pub fn transfer_shares(
    shares: &[f64],
    donor: usize,
    beneficiary: usize,
    delta: f64,
) -> Option<Vec<f64>> {
    if donor == beneficiary || shares[donor] <= delta {
        return None;
    }
    let mut adjusted = shares.to_vec();
    adjusted[donor] -= delta;
    adjusted[beneficiary] += delta;
    Some(adjusted)
}

fn beneficiary_metrics(
    config: &ForecastConfig,
    shares: &[f64],
    beneficiary: &str,
    seed_offset: u64,
) -> Result<ListMetrics, SimulationError> {
    let outcomes = simulate_election(config, shares, config.sensitivity_sims(), seed_offset)?;
    let table = seat_probabilities(&outcomes, config.lists(), config.seats());
    Ok(ListMetrics::from_table(&table, beneficiary).unwrap_or_default())
}

/// Rank donors by how much a `delta` transfer helps `beneficiary`.
///
/// Each run uses `config.sensitivity_sims()` trials. Donors holding `delta` or
/// less are skipped. Rows keep configuration order among equal gains.
pub fn targeting_report(
    config: &ForecastConfig,
    beneficiary: &str,
    delta: f64,
) -> Result<TargetingReport, SimulationError> {
    let Some(target) = config.list_index(beneficiary) else {
        return Ok(TargetingReport::NotApplicable {
            beneficiary: beneficiary.to_string(),
        });
    };

    let base_shares = config.base_shares();
    let baseline = beneficiary_metrics(config, base_shares, beneficiary, BASELINE_SEED_OFFSET)?;

    let transfers: Vec<(usize, Vec<f64>)> = (0..config.lists().len())
        .filter_map(|donor| {
            transfer_shares(base_shares, donor, target, delta).map(|shares| (donor, shares))
        })
        .collect();

    let evaluate = |(donor, shares): (usize, Vec<f64>)| {
        let metrics = beneficiary_metrics(
            config,
            &shares,
            beneficiary,
            DONOR_SEED_OFFSET + donor as u64,
        )?;
        let gain = metrics.minus(&baseline);
        Ok::<_, SimulationError>(TargetingRow {
            donor: config.lists()[donor].clone(),
            delta_expected: gain.expected_seats,
            delta_prob_ge_1: gain.prob_ge_1,
            delta_prob_ge_2: gain.prob_ge_2,
        })
    };

    #[cfg(feature = "parallel")]
    let rows: Result<Vec<TargetingRow>, SimulationError> =
        transfers.into_par_iter().map(evaluate).collect();

    #[cfg(not(feature = "parallel"))]
    let rows: Result<Vec<TargetingRow>, SimulationError> =
        transfers.into_iter().map(evaluate).collect();

    let mut rows = rows?;
    rank_donors(&mut rows);

    Ok(TargetingReport::Ranked {
        beneficiary: beneficiary.to_string(),
        delta,
        baseline,
        rows,
    })
}

/// Stable sort by descending expected-seat gain
pub fn rank_donors(rows: &mut [TargetingRow]) {
    rows.sort_by(|a, b| b.delta_expected.total_cmp(&a.delta_expected));
}

impl TargetingReport {
    /// Donor rows, empty when not applicable
    pub fn rows(&self) -> &[TargetingRow] {
        match self {
            TargetingReport::NotApplicable { .. } => &[],
            TargetingReport::Ranked { rows, .. } => rows,
        }
    }

    pub fn beneficiary(&self) -> &str {
        match self {
            TargetingReport::NotApplicable { beneficiary }
            | TargetingReport::Ranked { beneficiary, .. } => beneficiary,
        }
    }

    /// Plain-text ranked table with explanatory notes
    pub fn render(&self) -> String {
        let (beneficiary, delta, rows) = match self {
            TargetingReport::NotApplicable { beneficiary } => {
                return format!("{beneficiary} not found in lists. No targeting report generated.");
            }
            TargetingReport::Ranked {
                beneficiary,
                delta,
                rows,
                ..
            } => (beneficiary, *delta, rows),
        };

        let mut out = format!("{beneficiary} Targeting Guidance (model-based)\n\n");
        out.push_str(&format!(
            "Scenario: {beneficiary} gains {:.1}pp from a single other list.\n",
            delta * 100.0
        ));
        out.push_str(&format!(
            "Ranking is by increase in expected seats for {beneficiary}.\n\n"
        ));
        out.push_str(&format!(
            "Rank | Donor | +Expected seats | +P({beneficiary}>=1) | +P({beneficiary}>=2)\n"
        ));
        out.push_str("-----|-------|-----------------|-----------|----------\n");
        for (rank, row) in rows.iter().enumerate() {
            out.push_str(&format!(
                "{:>4} | {:<5} | {:+.3}         | {:+.3}    | {:+.3}\n",
                rank + 1,
                row.donor,
                row.delta_expected,
                row.delta_prob_ge_1,
                row.delta_prob_ge_2
            ));
        }
        out.push_str("\nNotes:\n");
        out.push_str("- This compares hypothetical transfers of a fixed vote share.\n");
        out.push_str("- It does not say which voters are persuadable in practice.\n");
        out.push_str("- Use alongside field intel and polling, not as a standalone guide.");
        out
    }
}
