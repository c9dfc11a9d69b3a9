//! Summary record for a single forecast run.

use std::collections::BTreeMap;

use serde::Serialize;

use super::probabilities::{
    SeatProbabilityTable, allocation_entropy, expected_seats, probability_at_least, seat_entropy,
};
use crate::config::ForecastConfig;
use crate::simulation::OutcomeDistribution;

/// Number of most frequent allocations kept in a summary
pub const TOP_ALLOCATIONS: usize = 10;

/// One of the most frequent allocations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopAllocation {
    /// Seats per list
    pub allocation: BTreeMap<String, u32>,
    pub count: u64,
    pub probability: f64,
}

/// Parameters echoed back in a summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryConfig {
    pub seats: u32,
    pub sims: usize,
    pub concentration: f64,
    pub swing_sd: f64,
    pub swing_rho: f64,
    pub seed: Option<u64>,
}

impl From<&ForecastConfig> for SummaryConfig {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            seats: config.seats(),
            sims: config.sims(),
            concentration: config.concentration(),
            swing_sd: config.swing_sd(),
            swing_rho: config.swing_rho(),
            seed: config.seed(),
        }
    }
}

/// Headline metrics of a forecast run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub lists: Vec<String>,
    pub expected_seats: BTreeMap<String, f64>,
    pub prob_ge_1: BTreeMap<String, f64>,
    pub prob_ge_2: BTreeMap<String, f64>,
    pub seat_entropy: BTreeMap<String, f64>,
    pub allocation_entropy: f64,
    pub top_allocations: Vec<TopAllocation>,
    pub config: SummaryConfig,
}

/// The `limit` most frequent allocations, ties in first-seen order
pub fn top_allocations(
    outcomes: &OutcomeDistribution,
    lists: &[String],
    limit: usize,
) -> Vec<TopAllocation> {
    let total = outcomes.total();
    outcomes
        .most_common()
        .into_iter()
        .take(limit)
        .map(|(allocation, count)| TopAllocation {
            allocation: lists
                .iter()
                .cloned()
                .zip(allocation.seats().iter().copied())
                .collect(),
            count,
            probability: count as f64 / total as f64,
        })
        .collect()
}

/// Summarize one run of `config`
pub fn summarize(
    config: &ForecastConfig,
    outcomes: &OutcomeDistribution,
    table: &SeatProbabilityTable,
) -> SummaryRecord {
    SummaryRecord {
        lists: config.lists().to_vec(),
        expected_seats: expected_seats(table),
        prob_ge_1: probability_at_least(table, 1),
        prob_ge_2: probability_at_least(table, 2),
        seat_entropy: seat_entropy(table),
        allocation_entropy: allocation_entropy(outcomes),
        top_allocations: top_allocations(outcomes, config.lists(), TOP_ALLOCATIONS),
        config: SummaryConfig::from(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_allocations_rank_and_limit() {
        let lists = vec!["A".to_string(), "B".to_string()];
        let mut dist = OutcomeDistribution::new();
        dist.record_n(&[1, 1], 2);
        dist.record_n(&[2, 0], 5);
        dist.record_n(&[0, 2], 2);
        dist.record_n(&[2, 0], 1);

        let top = top_allocations(&dist, &lists, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].count, 6);
        assert_eq!(top[0].allocation["A"], 2);
        assert!((top[0].probability - 0.6).abs() < 1e-12);
        // [1, 1] was seen before [0, 2]
        assert_eq!(top[1].allocation["A"], 1);
        assert_eq!(top[1].count, 2);
    }
}
