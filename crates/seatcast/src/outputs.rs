//! Artifact writers
//!
//! CSV files are written with a header row and comma-separated fields; text
//! fields containing commas, quotes or newlines are quoted. Every artifact is
//! written through a temporary file and renamed into place.

use std::fs;
use std::io;
use std::path::Path;

use seatcast_core::{OutcomeDistribution, SeatProbabilityTable, SensitivityRow, SummaryRecord};

/// Write content to a file atomically using write-then-rename pattern.
///
/// The content is first written to `<file name>.tmp` next to the target, then
/// renamed over it.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One row per distinct allocation, most frequent first
pub fn seat_outcomes_csv(outcomes: &OutcomeDistribution, lists: &[String]) -> String {
    let total = outcomes.total() as f64;
    let mut out = String::new();

    for name in lists {
        out.push_str(&csv_field(name));
        out.push(',');
    }
    out.push_str("count,probability\n");

    for (allocation, count) in outcomes.most_common() {
        for seats in allocation.seats() {
            out.push_str(&format!("{seats},"));
        }
        out.push_str(&format!("{count},{}\n", count as f64 / total));
    }
    out
}

/// `P(list wins k seats)` for every list and every `k` in `0..=max_seats`
pub fn seat_probs_csv(table: &SeatProbabilityTable) -> String {
    let mut out = String::from("list,seats,probability\n");
    for (name, row) in table.iter() {
        let name = csv_field(name);
        for (seats, probability) in row.iter().enumerate() {
            out.push_str(&format!("{name},{seats},{probability}\n"));
        }
    }
    out
}

pub fn sensitivity_csv(rows: &[SensitivityRow]) -> String {
    let mut out = String::from("list,delta_pp,expected_seats,delta_expected\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(&row.list),
            row.delta_pp,
            row.expected_seats,
            row.delta_expected
        ));
    }
    out
}

/// Pretty-printed summary with object keys in sorted order
pub fn summary_json(summary: &SummaryRecord) -> serde_json::Result<String> {
    // serde_json's default map is ordered, so going through `Value` sorts keys
    let value = serde_json::to_value(summary)?;
    serde_json::to_string_pretty(&value)
}

pub fn write_seat_outcomes_csv(
    outcomes: &OutcomeDistribution,
    lists: &[String],
    path: &Path,
) -> io::Result<()> {
    atomic_write(path, &seat_outcomes_csv(outcomes, lists))
}

pub fn write_seat_probs_csv(table: &SeatProbabilityTable, path: &Path) -> io::Result<()> {
    atomic_write(path, &seat_probs_csv(table))
}

/// Returns `false` without touching the filesystem when there are no rows
pub fn write_sensitivity_csv(rows: &[SensitivityRow], path: &Path) -> io::Result<bool> {
    if rows.is_empty() {
        return Ok(false);
    }
    atomic_write(path, &sensitivity_csv(rows))?;
    Ok(true)
}

pub fn write_summary_json(summary: &SummaryRecord, path: &Path) -> io::Result<()> {
    let json = summary_json(summary).map_err(io::Error::other)?;
    atomic_write(path, &json)
}
