//! Seat-probability tables and per-list metrics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::simulation::OutcomeDistribution;

/// Probability of each seat count (0 through `max_seats`) for every list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatProbabilityTable {
    lists: Vec<String>,
    max_seats: u32,
    /// One row per list; `rows[i][s]` = P(list i wins exactly s seats)
    rows: Vec<Vec<f64>>,
}

impl SeatProbabilityTable {
    pub fn lists(&self) -> &[String] {
        &self.lists
    }

    pub fn max_seats(&self) -> u32 {
        self.max_seats
    }

    /// Probabilities for seat counts `0..=max_seats` of one list
    pub fn row(&self, list: &str) -> Option<&[f64]> {
        self.lists
            .iter()
            .position(|l| l == list)
            .map(|i| self.rows[i].as_slice())
    }

    pub fn probability(&self, list: &str, seats: u32) -> f64 {
        self.row(list)
            .and_then(|row| row.get(seats as usize))
            .copied()
            .unwrap_or(0.0)
    }

    /// Rows in list order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.lists
            .iter()
            .zip(&self.rows)
            .map(|(name, row)| (name.as_str(), row.as_slice()))
    }
}

/// Build the seat-probability table for `lists` from raw outcome counts.
///
/// An empty distribution yields all-zero rows. Seat counts above `max_seats`
/// are left out of the table, so such rows sum to less than 1.
pub fn seat_probabilities(
    outcomes: &OutcomeDistribution,
    lists: &[String],
    max_seats: u32,
) -> SeatProbabilityTable {
    let width = max_seats as usize + 1;
    let mut counts = vec![vec![0u64; width]; lists.len()];
    for (allocation, count) in outcomes.iter() {
        for (row, &seats) in counts.iter_mut().zip(allocation.seats()) {
            if let Some(cell) = row.get_mut(seats as usize) {
                *cell += count;
            }
        }
    }

    let total = outcomes.total();
    let rows = counts
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|c| {
                    if total == 0 {
                        0.0
                    } else {
                        c as f64 / total as f64
                    }
                })
                .collect()
        })
        .collect();

    SeatProbabilityTable {
        lists: lists.to_vec(),
        max_seats,
        rows,
    }
}

/// Expected seats per list: Σ seats × P(seats)
pub fn expected_seats(table: &SeatProbabilityTable) -> BTreeMap<String, f64> {
    table
        .iter()
        .map(|(name, row)| {
            let expected: f64 = row
                .iter()
                .enumerate()
                .map(|(seats, p)| seats as f64 * p)
                .sum();
            (name.to_string(), expected)
        })
        .collect()
}

/// P(seats ≥ `threshold`) per list
pub fn probability_at_least(table: &SeatProbabilityTable, threshold: u32) -> BTreeMap<String, f64> {
    table
        .iter()
        .map(|(name, row)| {
            let p: f64 = row.iter().skip(threshold as usize).sum();
            (name.to_string(), p)
        })
        .collect()
}

fn entropy_bits(probabilities: impl Iterator<Item = f64>) -> f64 {
    let mut entropy = 0.0;
    for p in probabilities.filter(|p| *p > 0.0) {
        entropy -= p * p.log2();
    }
    entropy
}

/// Shannon entropy (bits) of each list's seat-count distribution
pub fn seat_entropy(table: &SeatProbabilityTable) -> BTreeMap<String, f64> {
    table
        .iter()
        .map(|(name, row)| (name.to_string(), entropy_bits(row.iter().copied())))
        .collect()
}

/// Shannon entropy (bits) of the joint allocation distribution
pub fn allocation_entropy(outcomes: &OutcomeDistribution) -> f64 {
    let total = outcomes.total();
    if total == 0 {
        return 0.0;
    }
    entropy_bits(outcomes.iter().map(|(_, count)| count as f64 / total as f64))
}

/// Expected seats and threshold probabilities of a single list
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ListMetrics {
    pub expected_seats: f64,
    pub prob_ge_1: f64,
    pub prob_ge_2: f64,
}

impl ListMetrics {
    /// Metrics for `list`, or `None` if the table has no such list
    pub fn from_table(table: &SeatProbabilityTable, list: &str) -> Option<Self> {
        let row = table.row(list)?;
        Some(Self {
            expected_seats: row.iter().enumerate().map(|(s, p)| s as f64 * p).sum(),
            prob_ge_1: row.iter().skip(1).sum(),
            prob_ge_2: row.iter().skip(2).sum(),
        })
    }

    /// Component-wise `self - baseline`
    pub fn minus(&self, baseline: &ListMetrics) -> ListMetrics {
        ListMetrics {
            expected_seats: self.expected_seats - baseline.expected_seats,
            prob_ge_1: self.prob_ge_1 - baseline.prob_ge_1,
            prob_ge_2: self.prob_ge_2 - baseline.prob_ge_2,
        }
    }
}
