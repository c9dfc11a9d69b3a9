//! Forecast Builder
//!
//! Fluent construction of a validated `ForecastConfig`, mostly for tests,
//! benchmarks and embedding callers that do not start from a config file.
//!
//! ```ignore
//! let config = ForecastBuilder::new()
//!     .list("A", 0.42)
//!     .list("B", 0.33)
//!     .list("C", 0.25)
//!     .seats(7)
//!     .swing(0.04, -0.3)
//!     .right_bloc(["C"])
//!     .seed(1)
//!     .build()?;
//! ```

use super::{ForecastConfig, ForecastInput};
use crate::error::ConfigError;

/// Builder for `ForecastConfig`
#[derive(Debug, Clone, Default)]
pub struct ForecastBuilder {
    input: ForecastInput,
}

impl ForecastBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a list with its (unnormalized) base share
    #[must_use]
    pub fn list(mut self, name: impl Into<String>, share: f64) -> Self {
        self.input.lists.push(name.into());
        self.input.base_shares.push(share);
        self
    }

    #[must_use]
    pub fn seats(mut self, seats: u32) -> Self {
        self.input.seats = seats;
        self
    }

    #[must_use]
    pub fn sims(mut self, sims: usize) -> Self {
        self.input.sims = sims;
        self
    }

    #[must_use]
    pub fn sensitivity_sims(mut self, sims: usize) -> Self {
        self.input.sensitivity_sims = Some(sims);
        self
    }

    #[must_use]
    pub fn concentration(mut self, concentration: f64) -> Self {
        self.input.concentration = concentration;
        self
    }

    /// Set the bloc swing standard deviation and correlation
    #[must_use]
    pub fn swing(mut self, sd: f64, rho: f64) -> Self {
        self.input.swing_sd = sd;
        self.input.swing_rho = rho;
        self
    }

    #[must_use]
    pub fn left_bloc<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.left_bloc = Some(members.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn right_bloc<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.right_bloc = Some(members.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.input.seed = Some(seed);
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<ForecastConfig, ConfigError> {
        ForecastConfig::try_from(self.input)
    }
}
