//! JSON output for downstream consumers.
//!
//! Each run produces one file named after the time it ran, grouped in a
//! directory per date. Non-ASCII text (the articles are in Chinese) is
//! written as-is rather than `\u`-escaped.

use crate::models::Harvest;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Pretty-printed JSON for a harvest.
pub fn harvest_to_json(harvest: &Harvest) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(harvest)
}

/// Write a [`Harvest`] to a JSON file with date-based directory structure.
///
/// # Arguments
///
/// * `harvest` - The run's articles and image statistics
/// * `json_output_dir` - Base directory for JSON output
///
/// # Returns
///
/// The path of the written file, `{json_output_dir}/{date}/{HH-MM-SS}.json`,
/// or an error if directory creation or file writing fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_harvest(
    harvest: &Harvest,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = harvest_to_json(harvest)?;

    let full_json_dir = PathBuf::from(json_output_dir).join(&harvest.local_date);
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename =
        full_json_dir.join(format!("{}.json", harvest.local_time.replace(':', "-")));
    fs::write(&output_json_filename, json).await?;
    info!(
        path = %output_json_filename.display(),
        articles = harvest.articles.len(),
        "Wrote JSON file"
    );

    Ok(output_json_filename)
}
