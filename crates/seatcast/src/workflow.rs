//! The `simulate` workflow: one forecast run and its artifacts

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use seatcast_core::analysis::{seat_probabilities, summarize};
use seatcast_core::sensitivity::{DEFAULT_SENSITIVITY_DELTAS, sensitivity_table};
use seatcast_core::simulation::simulate_from_config;
use seatcast_core::targeting::{DEFAULT_BENEFICIARY, DEFAULT_TRANSFER, targeting_report};
use seatcast_core::{
    ForecastConfig, SeatProbabilityTable, SensitivityRow, SummaryRecord, TargetingReport,
};

use crate::outputs::{
    atomic_write, write_seat_outcomes_csv, write_seat_probs_csv, write_sensitivity_csv,
    write_summary_json,
};

/// Optional stages of a forecast run
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowOptions {
    /// Run the sensitivity sweep and write `sensitivity.csv`
    pub sensitivity: bool,
    pub deltas: Vec<f64>,
    /// List the targeting report is written for
    pub beneficiary: String,
    pub transfer: f64,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            sensitivity: true,
            deltas: DEFAULT_SENSITIVITY_DELTAS.to_vec(),
            beneficiary: DEFAULT_BENEFICIARY.to_string(),
            transfer: DEFAULT_TRANSFER,
        }
    }
}

/// Everything a forecast run produced
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub summary: SummaryRecord,
    pub seat_probabilities: SeatProbabilityTable,
    /// Empty when the sweep was disabled
    pub sensitivity: Vec<SensitivityRow>,
    pub targeting: TargetingReport,
    /// Artifact name to written path
    pub artifacts: BTreeMap<String, PathBuf>,
}

impl ForecastRun {
    pub fn artifact(&self, name: &str) -> Option<&Path> {
        self.artifacts.get(name).map(PathBuf::as_path)
    }
}

fn targeting_file_name(beneficiary: &str) -> String {
    format!("{}_targeting.txt", beneficiary.to_lowercase())
}

/// Run one forecast and write its artifacts into `out_dir`.
///
/// Artifacts are keyed `seat_outcomes_csv`, `seat_probs_csv`, `summary_json`,
/// `sensitivity_csv` (only when rows were written) and `targeting_txt`.
pub fn run_forecast(
    config: &ForecastConfig,
    out_dir: &Path,
    options: &WorkflowOptions,
) -> color_eyre::Result<ForecastRun> {
    fs::create_dir_all(out_dir)
        .wrap_err_with(|| format!("Failed to create output directory {}", out_dir.display()))?;
    let mut artifacts = BTreeMap::new();

    tracing::info!(
        sims = config.sims(),
        seats = config.seats(),
        seed = ?config.seed(),
        "Running forecast"
    );
    let outcomes = simulate_from_config(config, 0)?;
    let table = seat_probabilities(&outcomes, config.lists(), config.seats());
    let summary = summarize(config, &outcomes, &table);
    tracing::info!(
        distinct_allocations = outcomes.len(),
        allocation_entropy = summary.allocation_entropy,
        "Simulation complete"
    );

    let path = out_dir.join("seat_outcomes.csv");
    write_seat_outcomes_csv(&outcomes, config.lists(), &path)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    artifacts.insert("seat_outcomes_csv".to_string(), path);

    let path = out_dir.join("seat_probs.csv");
    write_seat_probs_csv(&table, &path)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    artifacts.insert("seat_probs_csv".to_string(), path);

    let path = out_dir.join("summary.json");
    write_summary_json(&summary, &path)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    artifacts.insert("summary_json".to_string(), path);

    let mut sensitivity = Vec::new();
    if options.sensitivity {
        tracing::info!(
            sims = config.sensitivity_sims(),
            deltas = options.deltas.len(),
            "Running sensitivity sweep"
        );
        sensitivity = sensitivity_table(config, &options.deltas)?;

        let path = out_dir.join("sensitivity.csv");
        let written = write_sensitivity_csv(&sensitivity, &path)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        if written {
            artifacts.insert("sensitivity_csv".to_string(), path);
        } else {
            tracing::warn!("Sensitivity sweep produced no rows; sensitivity.csv not written");
        }
    } else {
        tracing::debug!("Sensitivity sweep disabled");
    }

    tracing::info!(
        beneficiary = %options.beneficiary,
        transfer = options.transfer,
        "Running targeting analysis"
    );
    let targeting = targeting_report(config, &options.beneficiary, options.transfer)?;
    if let TargetingReport::NotApplicable { beneficiary } = &targeting {
        tracing::warn!("{beneficiary} not found in lists; targeting report is a notice only");
    }
    let path = out_dir.join(targeting_file_name(&options.beneficiary));
    atomic_write(&path, &targeting.render())
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    artifacts.insert("targeting_txt".to_string(), path);

    tracing::info!(
        artifacts = artifacts.len(),
        out_dir = %out_dir.display(),
        "Forecast artifacts written"
    );

    Ok(ForecastRun {
        summary,
        seat_probabilities: table,
        sensitivity,
        targeting,
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatcast_core::ForecastBuilder;
    use tempfile::tempdir;

    fn config() -> ForecastConfig {
        ForecastBuilder::new()
            .list("PC", 0.10)
            .list("LAB", 0.40)
            .list("CON", 0.30)
            .list("LD", 0.20)
            .seats(5)
            .sims(600)
            .sensitivity_sims(200)
            .left_bloc(["PC", "LAB", "LD"])
            .seed(3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_run_writes_all_artifacts() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("nested").join("out");

        let run = run_forecast(&config(), &out_dir, &WorkflowOptions::default()).unwrap();

        let names: Vec<&str> = run.artifacts.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "seat_outcomes_csv",
                "seat_probs_csv",
                "sensitivity_csv",
                "summary_json",
                "targeting_txt"
            ]
        );
        for path in run.artifacts.values() {
            assert!(path.exists(), "{} missing", path.display());
        }
        assert_eq!(
            run.artifact("targeting_txt").unwrap(),
            out_dir.join("pc_targeting.txt")
        );
        assert_eq!(run.sensitivity.len(), 4 * 6);

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out_dir.join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["config"]["sims"], 600);

        let targeting = fs::read_to_string(out_dir.join("pc_targeting.txt")).unwrap();
        assert!(targeting.starts_with("PC Targeting Guidance (model-based)"));
    }

    #[test]
    fn test_run_without_sensitivity() {
        let dir = tempdir().unwrap();
        let options = WorkflowOptions {
            sensitivity: false,
            ..WorkflowOptions::default()
        };

        let run = run_forecast(&config(), dir.path(), &options).unwrap();

        assert!(run.sensitivity.is_empty());
        assert!(run.artifact("sensitivity_csv").is_none());
        assert!(!dir.path().join("sensitivity.csv").exists());
    }

    #[test]
    fn test_missing_beneficiary_writes_notice() {
        let dir = tempdir().unwrap();
        let options = WorkflowOptions {
            sensitivity: false,
            beneficiary: "GRN".to_string(),
            ..WorkflowOptions::default()
        };

        let run = run_forecast(&config(), dir.path(), &options).unwrap();

        assert!(run.targeting.rows().is_empty());
        let text = fs::read_to_string(dir.path().join("grn_targeting.txt")).unwrap();
        assert_eq!(text, "GRN not found in lists. No targeting report generated.");
    }

    #[test]
    fn test_seeded_runs_write_identical_outcomes() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let options = WorkflowOptions {
            sensitivity: false,
            ..WorkflowOptions::default()
        };

        run_forecast(&config(), first.path(), &options).unwrap();
        run_forecast(&config(), second.path(), &options).unwrap();

        for name in ["seat_outcomes.csv", "seat_probs.csv", "summary.json"] {
            assert_eq!(
                fs::read_to_string(first.path().join(name)).unwrap(),
                fs::read_to_string(second.path().join(name)).unwrap()
            );
        }
    }
}
