//! JSON report of a batch run.
//!
//! Files are grouped by date, one file per run named after the local time
//! the run finished.

use crate::error::Result;
use crate::models::RunReport;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`RunReport`] to a JSON file under a per-date directory.
///
/// # Arguments
///
/// * `report` - The finished run to serialize
/// * `json_output_dir` - Base directory for JSON output
///
/// # Returns
///
/// The path of the written file, or an error if serialization, directory
/// creation or the write fails.
///
/// # Output Path
///
/// `{json_output_dir}/{local_date}/{HH-MM-SS}.json`, where the file name is
/// the report's `local_time` with colons replaced by dashes.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(report: &RunReport, json_output_dir: &str) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(report)?;

    let full_json_dir = Path::new(json_output_dir).join(&report.local_date);
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = full_json_dir.join(format!("{}.json", report.local_time.replace(':', "-")));
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename.display(), results = report.results.len(), "Wrote JSON report");

    Ok(output_json_filename)
}
