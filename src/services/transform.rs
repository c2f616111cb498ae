//! Report-to-record transformation.

use crate::models::report::Report;
use crate::models::telemetry::TelemetryRecord;
use crate::models::test_case::TestCase;

/// Delimiter separating entries in the failure summary.
const SUMMARY_DELIMITER: &str = "----------------------------------------";

/// Flatten a report into one normalized telemetry record per test case,
/// preserving input order: split reports yield passes then failures, unified
/// reports yield tests as-is.
pub fn transform(report: &Report) -> Vec<TelemetryRecord> {
    report.cases().map(to_record).collect()
}

fn to_record(case: &TestCase) -> TelemetryRecord {
    TelemetryRecord {
        file: case.file.clone(),
        title: case.title.clone(),
        full_title: case.full_title.clone(),
        suite: case.suite(),
        duration_ms: case.duration,
        failed: case.is_failed(),
        error_message: case.error_message().map(String::from),
        error_stack: case.error_stack().map(String::from),
    }
}

/// Human-readable summary of the failed cases (file, full title, error
/// message, stack trace), for log output only. Returns None when every case
/// passed.
pub fn failure_summary(records: &[TelemetryRecord]) -> Option<String> {
    let failed: Vec<&TelemetryRecord> = records.iter().filter(|r| r.failed).collect();
    if failed.is_empty() {
        return None;
    }

    let entries: Vec<String> = failed
        .iter()
        .map(|record| {
            let mut lines = Vec::new();
            if let Some(file) = &record.file {
                lines.push(format!("file: {}", file));
            }
            lines.push(format!(
                "test: {}",
                record.full_title.as_deref().unwrap_or(&record.title)
            ));
            if let Some(message) = &record.error_message {
                lines.push(format!("error: {}", message));
            }
            if let Some(stack) = &record.error_stack {
                lines.push(stack.clone());
            }
            lines.join("\n")
        })
        .collect();

    Some(entries.join(&format!("\n{}\n", SUMMARY_DELIMITER)))
}
