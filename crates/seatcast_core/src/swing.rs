//! Correlated bloc swing
//!
//! Each trial draws a pair of log-scale swings `(left, right)` from a
//! bivariate normal with mean zero, common standard deviation `sd` and
//! correlation `rho`. Every list's base share is multiplied by the exponential
//! of its bloc's swing and the vector is renormalized, so lists inside one
//! bloc move together. A swing large enough to push a share below the
//! smallest float leaves that list with zero share.

use rand::Rng;
use rand::distr::Distribution;
use rand_distr::StandardNormal;

use crate::config::{Bloc, ForecastConfig};

/// One draw of the two bloc swings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlocSwing {
    pub left: f64,
    pub right: f64,
}

impl BlocSwing {
    pub fn for_bloc(&self, bloc: Bloc) -> f64 {
        match bloc {
            Bloc::Left => self.left,
            Bloc::Right => self.right,
        }
    }
}

/// Swing generator with precomputed bloc membership
#[derive(Debug, Clone)]
pub struct SwingModel {
    blocs: Vec<Bloc>,
    sd: f64,
    rho: f64,
}

impl SwingModel {
    pub fn new(config: &ForecastConfig) -> Self {
        Self::from_parts(config.blocs(), config.swing_sd(), config.swing_rho())
    }

    pub fn from_parts(blocs: Vec<Bloc>, sd: f64, rho: f64) -> Self {
        Self { blocs, sd, rho }
    }

    /// Sample `(left, right)` with covariance `[[sd², rho·sd²], [rho·sd², sd²]]`.
    ///
    /// Uses the Cholesky factor of the covariance, so a zero `sd` always
    /// yields zero swing without consuming a different number of draws.
    pub fn sample_swing<R: Rng + ?Sized>(&self, rng: &mut R) -> BlocSwing {
        let z1: f64 = StandardNormal.sample(rng);
        let z2: f64 = StandardNormal.sample(rng);
        let independent = (1.0 - self.rho * self.rho).max(0.0).sqrt();
        BlocSwing {
            left: self.sd * z1,
            right: self.sd * (self.rho * z1 + independent * z2),
        }
    }

    /// Apply one swing draw to `shares`, writing the renormalized result into `out`.
    ///
    /// Works on log shares and subtracts the largest before exponentiating, so
    /// the leading list always keeps a positive share however large the swing.
    pub fn apply(&self, shares: &[f64], swing: BlocSwing, out: &mut Vec<f64>) {
        out.clear();
        out.extend(shares.iter().zip(&self.blocs).map(|(share, bloc)| {
            let lift = swing.for_bloc(*bloc).clamp(f64::MIN, f64::MAX);
            share.ln() + lift
        }));
        let max = out.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for value in out.iter_mut() {
            *value = (*value - max).exp();
        }
        let total: f64 = out.iter().sum();
        for value in out.iter_mut() {
            *value /= total;
        }
    }

    /// Draw a swing and apply it to `shares`
    pub fn swing<R: Rng + ?Sized>(&self, shares: &[f64], rng: &mut R, out: &mut Vec<f64>) {
        let swing = self.sample_swing(rng);
        self.apply(shares, swing, out);
    }
}
