//! Run orchestration: read, parse, transform, batch, dispatch.

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::github_context::GitHubContext;
use crate::models::report::Report;
use crate::services::artifact::archive_report;
use crate::services::batch::into_batches;
use crate::services::dispatch::{TelemetrySink, dispatch};
use crate::services::transform::{failure_summary, transform};

/// Terminal state of one pipeline run.
#[derive(Debug)]
pub enum PipelineStatus {
    /// The pipeline ran to the end. Delivery failures are reported here but
    /// do not make the run unsuccessful.
    Completed {
        records: usize,
        batches: usize,
        failed_deliveries: usize,
    },
    /// A fatal condition stopped the pipeline before any network activity.
    Aborted { reason: String },
}

/// Execute one full run against the given sink.
///
/// Fatal conditions (unreadable input, unrecognized schema) short-circuit to
/// `Aborted`; everything after the report is validated runs to completion
/// regardless of per-batch delivery failures.
pub async fn run_pipeline(config: &Config, sink: &dyn TelemetrySink) -> PipelineStatus {
    // Read the raw report. A missing or unreadable file aborts the run.
    let raw = match tokio::fs::read(&config.report_file).await {
        Ok(raw) => raw,
        Err(e) => {
            return PipelineStatus::Aborted {
                reason: format!("{} not found: {}", config.report_file.display(), e),
            };
        }
    };

    if config.verbose_log {
        debug!("Raw report: {}", String::from_utf8_lossy(&raw));
    }

    let document = match Report::parse_document(&raw) {
        Ok(document) => document,
        Err(e) => {
            return PipelineStatus::Aborted {
                reason: format!("{} is not readable: {}", config.report_file.display(), e),
            };
        }
    };

    // Archive the raw report before shape validation so a malformed report
    // still leaves evidence behind. Archival failure never fails the run.
    if config.upload_artifact {
        if let Err(e) = archive_report(
            &config.report_file,
            &config.artifact_dir,
            config.job_id.as_deref(),
        )
        .await
        {
            warn!("artifact: archival failed, continuing: {}", e);
        }
    }

    let report = match Report::from_value(document) {
        Ok(report) => report,
        Err(_) => {
            return PipelineStatus::Aborted {
                reason: "Test data are not in the correct format.".to_string(),
            };
        }
    };

    let context = GitHubContext::capture(config.job_id.as_deref());
    if config.verbose_log {
        debug!("Execution context: {:?}", context);
    }

    let records = transform(&report);
    info!(
        "Transformed {} test case(s) into {} telemetry record(s)",
        report.len(),
        records.len()
    );

    if let Some(summary) = failure_summary(&records) {
        warn!("Failed test cases:\n{}", summary);
    }

    let mut common = context.attributes();
    if let Some(metric_id) = &config.metric_id {
        common.insert("metricId".to_string(), metric_id.clone().into());
    }

    let batches = into_batches(&records, config.max_records_per_batch);
    let outcomes = dispatch(sink, &batches, &common, config.telemetry_kind).await;
    let failed_deliveries = outcomes.iter().filter(|o| !o.is_success()).count();

    PipelineStatus::Completed {
        records: records.len(),
        batches: outcomes.len(),
        failed_deliveries,
    }
}
