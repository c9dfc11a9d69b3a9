//! Seat forecasting simulation library
//!
//! This crate provides a Monte Carlo engine for forecasting how the seats of a
//! legislature are split between competing lists under D'Hondt allocation.
//! It supports:
//! - Validated, immutable forecast configuration with left/right bloc resolution
//! - Correlated bloc-level log-normal swing around polling shares
//! - Dirichlet sampling noise controlled by a concentration parameter
//! - Seat-probability tables, expected seats, threshold probabilities and entropy
//! - Sensitivity sweeps over one-list share perturbations
//! - Vote-transfer targeting reports ranking donor lists for a beneficiary
//!
//! # Example
//!
//! ```ignore
//! use seatcast_core::ForecastBuilder;
//! use seatcast_core::analysis::{seat_probabilities, summarize};
//! use seatcast_core::simulation::simulate_from_config;
//!
//! let config = ForecastBuilder::new()
//!     .list("A", 0.5)
//!     .list("B", 0.3)
//!     .list("C", 0.2)
//!     .seats(6)
//!     .sims(5_000)
//!     .seed(42)
//!     .left_bloc(["A"])
//!     .build()?;
//!
//! let outcomes = simulate_from_config(&config, 0)?;
//! let table = seat_probabilities(&outcomes, config.lists(), config.seats());
//! let summary = summarize(&config, &outcomes, &table);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod allocation;
pub mod analysis;
pub mod error;
pub mod sensitivity;
pub mod simulation;
pub mod swing;
pub mod targeting;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::{SeatProbabilityTable, SummaryRecord, TopAllocation};
pub use config::{ConfigOverrides, ForecastBuilder, ForecastConfig, ForecastInput};
pub use error::{ConfigError, SimulationError};
pub use sensitivity::SensitivityRow;
pub use simulation::{OutcomeDistribution, SeatAllocation};
pub use targeting::{TargetingReport, TargetingRow};
