//! Forecast configuration
//!
//! `ForecastInput` is the unvalidated record produced by a front end (for
//! example from YAML). Converting it into a `ForecastConfig` normalizes the
//! base shares, resolves the two swing blocs and checks every parameter range.
//! A `ForecastConfig` is never mutated after construction; overrides produce a
//! new, re-validated record.
//!
//! # Bloc resolution
//!
//! - neither bloc given: every list is in the left bloc, the right bloc is empty
//! - one bloc given: the other bloc is its complement within the list set
//! - both given: used as given, and together they must cover every list

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub mod builder;

pub use builder::ForecastBuilder;

fn default_seats() -> u32 {
    6
}

fn default_sims() -> usize {
    10_000
}

fn default_concentration() -> f64 {
    50.0
}

fn default_swing_sd() -> f64 {
    0.03
}

fn default_swing_rho() -> f64 {
    -0.5
}

/// Sensitivity runs default to at most 2000 trials
fn default_sensitivity_sims(sims: usize) -> usize {
    sims.min(2000)
}

/// Unvalidated forecast parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastInput {
    #[serde(default)]
    pub lists: Vec<String>,

    /// Raw vote shares; normalized during validation
    #[serde(default)]
    pub base_shares: Vec<f64>,

    #[serde(default = "default_seats")]
    pub seats: u32,

    #[serde(default = "default_sims")]
    pub sims: usize,

    /// Dirichlet concentration (larger = tighter sampling around the mean)
    #[serde(default = "default_concentration")]
    pub concentration: f64,

    /// Standard deviation of the log-scale bloc swing
    #[serde(default = "default_swing_sd")]
    pub swing_sd: f64,

    /// Correlation between left and right bloc swings
    #[serde(default = "default_swing_rho")]
    pub swing_rho: f64,

    #[serde(default)]
    pub left_bloc: Option<Vec<String>>,

    #[serde(default)]
    pub right_bloc: Option<Vec<String>>,

    #[serde(default)]
    pub seed: Option<u64>,

    /// Trials per sensitivity/targeting run; defaults to `min(2000, sims)`
    #[serde(default)]
    pub sensitivity_sims: Option<usize>,
}

impl Default for ForecastInput {
    fn default() -> Self {
        Self {
            lists: Vec::new(),
            base_shares: Vec::new(),
            seats: default_seats(),
            sims: default_sims(),
            concentration: default_concentration(),
            swing_sd: default_swing_sd(),
            swing_rho: default_swing_rho(),
            left_bloc: None,
            right_bloc: None,
            seed: None,
            sensitivity_sims: None,
        }
    }
}

/// Which correlated swing a list follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bloc {
    Left,
    Right,
}

/// Validated, immutable forecast configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastConfig {
    lists: Vec<String>,
    base_shares: Vec<f64>,
    seats: u32,
    sims: usize,
    concentration: f64,
    swing_sd: f64,
    swing_rho: f64,
    left_bloc: BTreeSet<String>,
    right_bloc: BTreeSet<String>,
    seed: Option<u64>,
    sensitivity_sims: usize,
}

/// Parameter overrides applied on top of a loaded configuration.
///
/// `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub sims: Option<usize>,
    pub seed: Option<u64>,
    pub sensitivity_sims: Option<usize>,
    pub concentration: Option<f64>,
    pub swing_sd: Option<f64>,
    pub swing_rho: Option<f64>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl TryFrom<ForecastInput> for ForecastConfig {
    type Error = ConfigError;

    fn try_from(input: ForecastInput) -> Result<Self, Self::Error> {
        if input.lists.is_empty() {
            return Err(ConfigError::EmptyLists);
        }
        let mut seen = BTreeSet::new();
        for name in &input.lists {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateList(name.clone()));
            }
        }
        if input.lists.len() != input.base_shares.len() {
            return Err(ConfigError::ShareLengthMismatch {
                lists: input.lists.len(),
                shares: input.base_shares.len(),
            });
        }

        let base_shares = normalize_shares(&input.lists, &input.base_shares)?;

        let left = input
            .left_bloc
            .unwrap_or_default()
            .into_iter()
            .collect::<BTreeSet<_>>();
        let right = input
            .right_bloc
            .unwrap_or_default()
            .into_iter()
            .collect::<BTreeSet<_>>();
        let (left_bloc, right_bloc) = resolve_blocs(&input.lists, left, right)?;

        let sensitivity_sims = input
            .sensitivity_sims
            .unwrap_or_else(|| default_sensitivity_sims(input.sims));

        let config = Self {
            lists: input.lists,
            base_shares,
            seats: input.seats,
            sims: input.sims,
            concentration: input.concentration,
            swing_sd: input.swing_sd,
            swing_rho: input.swing_rho,
            left_bloc,
            right_bloc,
            seed: input.seed,
            sensitivity_sims,
        };
        config.validate_parameters()?;
        Ok(config)
    }
}

impl ForecastConfig {
    /// List identifiers in configuration order
    pub fn lists(&self) -> &[String] {
        &self.lists
    }

    /// Normalized base shares, parallel to `lists()`
    pub fn base_shares(&self) -> &[f64] {
        &self.base_shares
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }

    pub fn sims(&self) -> usize {
        self.sims
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    pub fn swing_sd(&self) -> f64 {
        self.swing_sd
    }

    pub fn swing_rho(&self) -> f64 {
        self.swing_rho
    }

    pub fn left_bloc(&self) -> &BTreeSet<String> {
        &self.left_bloc
    }

    pub fn right_bloc(&self) -> &BTreeSet<String> {
        &self.right_bloc
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn sensitivity_sims(&self) -> usize {
        self.sensitivity_sims
    }

    /// Position of a list in configuration order
    pub fn list_index(&self, name: &str) -> Option<usize> {
        self.lists.iter().position(|l| l == name)
    }

    /// Bloc membership for every list, in configuration order
    pub fn blocs(&self) -> Vec<Bloc> {
        self.lists
            .iter()
            .map(|name| {
                if self.left_bloc.contains(name) {
                    Bloc::Left
                } else {
                    Bloc::Right
                }
            })
            .collect()
    }

    /// Create a variant with the given overrides applied.
    ///
    /// The result is validated again; `self` is left untouched.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = self.clone();
        if let Some(sims) = overrides.sims {
            config.sims = sims;
        }
        if let Some(seed) = overrides.seed {
            config.seed = Some(seed);
        }
        if let Some(sensitivity_sims) = overrides.sensitivity_sims {
            config.sensitivity_sims = sensitivity_sims;
        }
        if let Some(concentration) = overrides.concentration {
            config.concentration = concentration;
        }
        if let Some(swing_sd) = overrides.swing_sd {
            config.swing_sd = swing_sd;
        }
        if let Some(swing_rho) = overrides.swing_rho {
            config.swing_rho = swing_rho;
        }
        config.validate_parameters()?;
        Ok(config)
    }

    fn validate_parameters(&self) -> Result<(), ConfigError> {
        check_minimum("seats", u64::from(self.seats), 1)?;
        check_minimum("sims", self.sims as u64, 1)?;
        check_minimum("sensitivity_sims", self.sensitivity_sims as u64, 1)?;

        if !(self.concentration.is_finite() && self.concentration > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "concentration",
                value: self.concentration,
                reason: "must be a positive number",
            });
        }
        if !(self.swing_sd.is_finite() && self.swing_sd >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "swing_sd",
                value: self.swing_sd,
                reason: "must be a non-negative number",
            });
        }
        if !(-1.0..=1.0).contains(&self.swing_rho) {
            return Err(ConfigError::OutOfRange {
                field: "swing_rho",
                value: self.swing_rho,
                reason: "must lie in [-1, 1]",
            });
        }
        Ok(())
    }
}

fn check_minimum(field: &'static str, value: u64, minimum: u64) -> Result<(), ConfigError> {
    if value < minimum {
        return Err(ConfigError::BelowMinimum {
            field,
            minimum,
            value,
        });
    }
    Ok(())
}

fn normalize_shares(lists: &[String], shares: &[f64]) -> Result<Vec<f64>, ConfigError> {
    for (name, &value) in lists.iter().zip(shares) {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::InvalidShare {
                list: name.clone(),
                value,
            });
        }
    }
    let total: f64 = shares.iter().sum();
    if !total.is_finite() {
        return Err(ConfigError::OutOfRange {
            field: "base_shares",
            value: total,
            reason: "sum must be finite",
        });
    }
    Ok(shares.iter().map(|v| v / total).collect())
}

/// Resolve the two swing blocs against the list set.
///
/// Unknown members and overlap are rejected before the complement rule is
/// applied, and the resolved pair must cover every list exactly once.
pub fn resolve_blocs(
    lists: &[String],
    left: BTreeSet<String>,
    right: BTreeSet<String>,
) -> Result<(BTreeSet<String>, BTreeSet<String>), ConfigError> {
    let all: BTreeSet<String> = lists.iter().cloned().collect();

    let unknown: Vec<String> = left.union(&right).filter(|m| !all.contains(*m)).cloned().collect();
    if !unknown.is_empty() {
        return Err(ConfigError::UnknownBlocMembers(unknown));
    }
    let overlap: Vec<String> = left.intersection(&right).cloned().collect();
    if !overlap.is_empty() {
        return Err(ConfigError::BlocOverlap(overlap));
    }

    let (left, right) = match (left.is_empty(), right.is_empty()) {
        (true, true) => (all, BTreeSet::new()),
        (false, true) => {
            let complement = all.difference(&left).cloned().collect();
            (left, complement)
        }
        (true, false) => {
            let complement = all.difference(&right).cloned().collect();
            (complement, right)
        }
        (false, false) => (left, right),
    };

    let unassigned: Vec<String> = lists
        .iter()
        .filter(|name| !left.contains(*name) && !right.contains(*name))
        .cloned()
        .collect();
    if !unassigned.is_empty() {
        return Err(ConfigError::UnassignedLists(unassigned));
    }

    Ok((left, right))
}
