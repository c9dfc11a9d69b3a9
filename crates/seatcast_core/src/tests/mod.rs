//! Scenario tests for the forecasting engine
//!
//! Tests are organized by topic:
//! - `simulation` - Reproducibility, seat conservation and outcome invariants
//! - `sensitivity` - Perturbation sweep ordering and skip rules
//! - `targeting` - Donor ranking and report determinism

mod simulation;

use crate::config::{ForecastBuilder, ForecastConfig};

/// Three-list forecast with a real spread of outcomes
pub(crate) fn three_list_config(seed: Option<u64>) -> ForecastConfig {
    let builder = ForecastBuilder::new()
        .list("A", 0.42)
        .list("B", 0.33)
        .list("C", 0.25)
        .seats(7)
        .sims(2_500)
        .sensitivity_sims(400)
        .concentration(50.0)
        .swing(0.05, -0.5)
        .left_bloc(["A"]);
    let builder = match seed {
        Some(seed) => builder.seed(seed),
        None => builder,
    };
    builder.build().unwrap()
}
