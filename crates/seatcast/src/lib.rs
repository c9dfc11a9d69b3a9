//! Seat forecasting command-line front end
//!
//! Loads a YAML forecast configuration, runs the `seatcast_core` engine and
//! writes the run's artifacts:
//! - `seat_outcomes.csv` and `seat_probs.csv`
//! - `summary.json`
//! - `sensitivity.csv` (optional)
//! - `<beneficiary>_targeting.txt`

pub mod config_file;
pub mod logging;
pub mod outputs;
pub mod workflow;

pub use config_file::{load_config, parse_config_yaml};
pub use logging::init_logging;
pub use workflow::{ForecastRun, WorkflowOptions, run_forecast};
