//! Raw report archival side channel.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::error::{AppError, AppResult};

/// Archive the raw report file into the artifact directory.
///
/// Artifact filename format: `test_results_{job}_{YYYY-MM-DD-HH-MM-SS}` with
/// the report's own extension preserved. Returns the path to the archived
/// copy.
pub async fn archive_report(
    report_file: &Path,
    artifact_dir: &Path,
    job_id: Option<&str>,
) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(artifact_dir)
        .await
        .map_err(|e| AppError::FileSystem(format!("Failed to create artifact directory: {}", e)))?;

    let timestamp = Utc::now().format("%Y-%m-%d-%H-%M-%S");
    let mut artifact_name = format!("test_results_{}_{}", job_id.unwrap_or("unknown"), timestamp);
    if let Some(ext) = report_file.extension().and_then(|e| e.to_str()) {
        artifact_name.push('.');
        artifact_name.push_str(ext);
    }

    let artifact_path = artifact_dir.join(&artifact_name);
    tokio::fs::copy(report_file, &artifact_path)
        .await
        .map_err(|e| AppError::FileSystem(format!("Failed to archive report file: {}", e)))?;

    info!("Archived report to {}", artifact_path.display());

    Ok(artifact_path)
}
