//! Outcome analysis
//!
//! Pure functions turning an `OutcomeDistribution` into seat probabilities and
//! summary metrics. Nothing here draws random numbers or touches I/O.
//!
//! ```ignore
//! let outcomes = simulate_from_config(&config, 0)?;
//! let table = seat_probabilities(&outcomes, config.lists(), config.seats());
//! let expected = expected_seats(&table);
//! let summary = summarize(&config, &outcomes, &table);
//! ```

mod probabilities;
mod summary;

pub use probabilities::*;
pub use summary::*;
