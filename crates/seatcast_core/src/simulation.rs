//! Monte Carlo seat simulation
//!
//! A run is a sequence of independent trials. Each trial swings the base
//! shares by bloc, draws a Dirichlet-distributed vote split around the swung
//! mean, and allocates seats with the D'Hondt rule. The resulting allocation
//! tuples are counted in an `OutcomeDistribution`.
//!
//! Trials are grouped into fixed-size batches. A master generator, seeded from
//! `seed + seed_offset` (or the OS when there is no seed), derives one seed per
//! batch in batch order. Batch results are merged in batch order, so a seeded
//! run produces the same distribution whether or not batches run in parallel.

use std::borrow::Borrow;

use rand::distr::{Distribution, Open01};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::Gamma;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::allocation::dhondt_seats;
use crate::config::ForecastConfig;
use crate::error::SimulationError;
use crate::swing::SwingModel;

/// Trials simulated per independent random stream
pub const TRIALS_PER_BATCH: usize = 1_000;

/// Seats won by each list in one trial, in configuration order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeatAllocation(pub Vec<u32>);

impl SeatAllocation {
    pub fn seats(&self) -> &[u32] {
        &self.0
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl Borrow<[u32]> for SeatAllocation {
    fn borrow(&self) -> &[u32] {
        &self.0
    }
}

impl From<Vec<u32>> for SeatAllocation {
    fn from(seats: Vec<u32>) -> Self {
        Self(seats)
    }
}

/// Occurrence counts of seat allocations.
///
/// Entries keep first-seen order, which breaks ties when ranking by frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeDistribution {
    entries: Vec<(SeatAllocation, u64)>,
    index: FxHashMap<SeatAllocation, usize>,
}

impl OutcomeDistribution {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `seats`
    pub fn record(&mut self, seats: &[u32]) {
        self.record_n(seats, 1);
    }

    /// Count `count` occurrences of `seats`
    pub fn record_n(&mut self, seats: &[u32], count: u64) {
        match self.index.get(seats) {
            Some(&i) => self.entries[i].1 += count,
            None => {
                let allocation = SeatAllocation(seats.to_vec());
                self.index.insert(allocation.clone(), self.entries.len());
                self.entries.push((allocation, count));
            }
        }
    }

    /// Add every count from `other`.
    ///
    /// Allocations new to `self` are appended in `other`'s first-seen order.
    pub fn merge(&mut self, other: OutcomeDistribution) {
        for (allocation, count) in other.entries {
            self.record_n(allocation.seats(), count);
        }
    }

    /// Number of trials recorded
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Number of distinct allocations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, seats: &[u32]) -> u64 {
        self.index
            .get(seats)
            .map(|&i| self.entries[i].1)
            .unwrap_or(0)
    }

    /// Iterate in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&SeatAllocation, u64)> {
        self.entries.iter().map(|(allocation, count)| (allocation, *count))
    }

    /// All allocations by descending count, ties in first-seen order
    pub fn most_common(&self) -> Vec<(&SeatAllocation, u64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

impl FromIterator<Vec<u32>> for OutcomeDistribution {
    fn from_iter<I: IntoIterator<Item = Vec<u32>>>(iter: I) -> Self {
        let mut distribution = Self::new();
        for seats in iter {
            distribution.record(&seats);
        }
        distribution
    }
}

/// Generator for one run: reproducible with a seed, fresh from the OS otherwise
pub fn run_rng(seed: Option<u64>, seed_offset: u64) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(seed_offset)),
        None => SmallRng::from_os_rng(),
    }
}

/// Draw one Dirichlet sample with concentrations `mean[i] * concentration`.
///
/// Sampled as independent `Gamma(alpha_i, 1)` variates normalized to sum 1,
/// kept in log space so small concentrations cannot underflow every draw.
/// For `alpha_i < 1` the log variate is `ln Gamma(alpha_i + 1) + ln(U) / alpha_i`.
/// A zero concentration contributes a zero share. If every log variate is
/// `-inf` the whole share goes to one list `i`, picked with probability
/// `alpha_i / sum(alpha)`.
pub fn sample_dirichlet<R: Rng + ?Sized>(
    lists: &[String],
    mean: &[f64],
    concentration: f64,
    rng: &mut R,
    out: &mut Vec<f64>,
) -> Result<(), SimulationError> {
    out.clear();
    for (name, &share) in lists.iter().zip(mean) {
        let alpha = share * concentration;
        let invalid = || SimulationError::InvalidConcentration {
            list: name.clone(),
            alpha,
        };
        if !(alpha.is_finite() && alpha >= 0.0) {
            return Err(invalid());
        }
        let log_variate = if alpha == 0.0 {
            f64::NEG_INFINITY
        } else if alpha < 1.0 {
            let boosted: f64 = Gamma::new(alpha + 1.0, 1.0)
                .map_err(|_| invalid())?
                .sample(rng);
            let u: f64 = Open01.sample(rng);
            boosted.ln() + u.ln() / alpha
        } else {
            let variate: f64 = Gamma::new(alpha, 1.0).map_err(|_| invalid())?.sample(rng);
            variate.ln()
        };
        out.push(log_variate);
    }

    let max = out.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() {
        for value in out.iter_mut() {
            *value = (*value - max).exp();
        }
        let total: f64 = out.iter().sum();
        for value in out.iter_mut() {
            *value /= total;
        }
        return Ok(());
    }

    let weights: Vec<f64> = mean.iter().map(|share| share * concentration).collect();
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        pick_corner(&weights, total, lists, rng, out)
    } else {
        // the concentrations underflowed as a sum; their ratios are the mean's
        pick_corner(mean, mean.iter().sum(), lists, rng, out)
    }
}

/// Put the whole share on one list chosen with probability `weights[i] / total`
fn pick_corner<R: Rng + ?Sized>(
    weights: &[f64],
    total: f64,
    lists: &[String],
    rng: &mut R,
    out: &mut Vec<f64>,
) -> Result<(), SimulationError> {
    if !(total.is_finite() && total > 0.0) {
        return Err(SimulationError::InvalidConcentration {
            list: lists.first().cloned().unwrap_or_default(),
            alpha: total,
        });
    }
    let u: f64 = Open01.sample(rng);
    let target = u * total;
    let mut chosen = weights.len() - 1;
    let mut cumulative = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if target < cumulative {
            chosen = i;
            break;
        }
    }
    out.clear();
    out.resize(weights.len(), 0.0);
    out[chosen] = 1.0;
    Ok(())
}

/// Everything a trial reads; shared by all batches of a run
struct TrialRunner<'a> {
    lists: &'a [String],
    shares: &'a [f64],
    seats: u32,
    concentration: f64,
    swing: SwingModel,
}

impl TrialRunner<'_> {
    fn run_batch(&self, trials: usize, rng: &mut SmallRng) -> Result<OutcomeDistribution, SimulationError> {
        let mut outcomes = OutcomeDistribution::new();
        let mut swung = Vec::with_capacity(self.shares.len());
        let mut votes = Vec::with_capacity(self.shares.len());

        for _ in 0..trials {
            self.swing.swing(self.shares, rng, &mut swung);
            sample_dirichlet(self.lists, &swung, self.concentration, rng, &mut votes)?;
            outcomes.record(&dhondt_seats(&votes, self.seats));
        }
        Ok(outcomes)
    }
}

/// Simulate `trials` elections around `shares`.
///
/// `shares` replaces the configured base shares (same length and order as
/// `config.lists()`); every other parameter comes from `config`. Runs with the
/// same seed and `seed_offset` produce identical distributions.
pub fn simulate_election(
    config: &ForecastConfig,
    shares: &[f64],
    trials: usize,
    seed_offset: u64,
) -> Result<OutcomeDistribution, SimulationError> {
    debug_assert_eq!(shares.len(), config.lists().len());

    let runner = TrialRunner {
        lists: config.lists(),
        shares,
        seats: config.seats(),
        concentration: config.concentration(),
        swing: SwingModel::new(config),
    };

    let mut master = run_rng(config.seed(), seed_offset);
    let num_batches = trials.div_ceil(TRIALS_PER_BATCH);
    let batch_seeds: Vec<u64> = (0..num_batches).map(|_| master.next_u64()).collect();

    let run = |(i, seed): (usize, u64)| {
        let batch_size = if i == num_batches - 1 {
            trials - i * TRIALS_PER_BATCH
        } else {
            TRIALS_PER_BATCH
        };
        let mut rng = SmallRng::seed_from_u64(seed);
        runner.run_batch(batch_size, &mut rng)
    };

    #[cfg(feature = "parallel")]
    let batches: Vec<Result<OutcomeDistribution, SimulationError>> =
        batch_seeds.into_par_iter().enumerate().map(run).collect();

    #[cfg(not(feature = "parallel"))]
    let batches: Vec<Result<OutcomeDistribution, SimulationError>> =
        batch_seeds.into_iter().enumerate().map(run).collect();

    batches
        .into_iter()
        .try_fold(OutcomeDistribution::new(), |mut merged, batch| {
            merged.merge(batch?);
            Ok(merged)
        })
}

/// Simulate `config.sims()` elections around the configured base shares
pub fn simulate_from_config(
    config: &ForecastConfig,
    seed_offset: u64,
) -> Result<OutcomeDistribution, SimulationError> {
    simulate_election(config, config.base_shares(), config.sims(), seed_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_counts_and_first_seen_order() {
        let dist: OutcomeDistribution = [vec![2, 1], vec![1, 2], vec![1, 2], vec![3, 0]]
            .into_iter()
            .collect();

        assert_eq!(dist.total(), 4);
        assert_eq!(dist.len(), 3);
        assert_eq!(dist.count(&[1, 2]), 2);
        assert_eq!(dist.count(&[0, 3]), 0);

        let ranked: Vec<_> = dist
            .most_common()
            .into_iter()
            .map(|(a, c)| (a.seats().to_vec(), c))
            .collect();
        assert_eq!(ranked, vec![(vec![1, 2], 2), (vec![2, 1], 1), (vec![3, 0], 1)]);
    }

    #[test]
    fn test_merge_adds_counts() {
        let mut left: OutcomeDistribution = [vec![1, 0], vec![0, 1]].into_iter().collect();
        let right: OutcomeDistribution = [vec![0, 1], vec![1, 0], vec![1, 0]].into_iter().collect();
        left.merge(right);

        assert_eq!(left.total(), 5);
        assert_eq!(left.count(&[1, 0]), 3);
        assert_eq!(left.count(&[0, 1]), 2);
    }

    #[test]
    fn test_merge_is_order_independent_for_counts() {
        let a: OutcomeDistribution = [vec![1, 1], vec![2, 0]].into_iter().collect();
        let b: OutcomeDistribution = [vec![0, 2], vec![1, 1]].into_iter().collect();

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b;
        ba.merge(a);

        for seats in [[1u32, 1], [2, 0], [0, 2]] {
            assert_eq!(ab.count(&seats), ba.count(&seats));
        }
        assert_eq!(ab.total(), ba.total());
    }

    #[test]
    fn test_dirichlet_sample_is_a_share_vector() {
        let lists = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let mut rng = SmallRng::seed_from_u64(9);
        let mut out = Vec::new();
        for _ in 0..50 {
            sample_dirichlet(&lists, &[0.5, 0.3, 0.2], 50.0, &mut rng, &mut out).unwrap();
            assert_eq!(out.len(), 3);
            assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(out.iter().all(|v| *v >= 0.0));
        }
    }

    #[test]
    fn test_dirichlet_zero_mean_gets_zero_share() {
        let lists = vec!["A".to_string(), "B".to_string()];
        let mut rng = SmallRng::seed_from_u64(1);
        let mut out = Vec::new();
        sample_dirichlet(&lists, &[1.0, 0.0], 10.0, &mut rng, &mut out).unwrap();
        assert_eq!(out, vec![1.0, 0.0]);
    }

    #[test]
    fn test_dirichlet_rejects_invalid_mean() {
        let lists = vec!["A".to_string(), "B".to_string()];
        let mut rng = SmallRng::seed_from_u64(1);
        let mut out = Vec::new();
        let err = sample_dirichlet(&lists, &[1.0, -0.5], 10.0, &mut rng, &mut out).unwrap_err();
        assert_eq!(
            err,
            SimulationError::InvalidConcentration {
                list: "B".into(),
                alpha: -5.0
            }
        );
        assert!(sample_dirichlet(&lists, &[f64::NAN, 0.5], 10.0, &mut rng, &mut out).is_err());
    }

    #[test]
    fn test_small_concentration_concentrates_on_one_list() {
        let lists = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let mut rng = SmallRng::seed_from_u64(4);
        let mut out = Vec::new();
        let mut wins = [0u32; 3];
        let mut near_corner = 0;
        for _ in 0..2000 {
            sample_dirichlet(&lists, &[0.5, 0.3, 0.2], 1e-3, &mut rng, &mut out).unwrap();
            assert!(out.iter().all(|v| v.is_finite() && *v >= 0.0));
            assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            let top = out.iter().copied().fold(0.0, f64::max);
            if top > 0.99 {
                near_corner += 1;
            }
            let winner = out.iter().position(|v| *v == top).unwrap();
            wins[winner] += 1;
        }
        assert!(near_corner >= 1950, "only {near_corner} samples near a corner");
        // the corner is list i with probability close to mean[i]
        assert!((800..1200).contains(&wins[0]), "{wins:?}");
        assert!((450..750).contains(&wins[1]), "{wins:?}");
        assert!((250..550).contains(&wins[2]), "{wins:?}");
    }

    #[test]
    fn test_vanishing_concentration_picks_a_corner() {
        let lists = vec!["A".to_string(), "B".to_string()];
        let mut rng = SmallRng::seed_from_u64(2);
        let mut out = Vec::new();
        for _ in 0..20 {
            sample_dirichlet(&lists, &[0.5, 0.5], 1e-320, &mut rng, &mut out).unwrap();
            assert!(out == vec![1.0, 0.0] || out == vec![0.0, 1.0], "{out:?}");
        }
    }

    #[test]
    fn test_seeded_rng_depends_on_offset() {
        let mut a = run_rng(Some(42), 0);
        let mut b = run_rng(Some(42), 0);
        let mut c = run_rng(Some(42), 1000);
        let first = a.next_u64();
        assert_eq!(first, b.next_u64());
        assert_ne!(first, c.next_u64());
    }
}
