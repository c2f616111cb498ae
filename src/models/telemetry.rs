//! Outbound telemetry records, batches, and payload envelopes.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::TelemetryKind;

/// One normalized telemetry record describing a single test case: identity
/// attributes, duration, pass/fail status, and optional error detail.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    pub duration_ms: u64,
    pub failed: bool,
    /// Included only when the source case carries a non-empty message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Included only when the source case carries a non-empty stack
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_stack: Option<String>,
}

impl TelemetryRecord {
    /// Identity attributes shared by every telemetry entry for this case.
    fn identity_attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert("title".to_string(), self.title.clone().into());
        if let Some(full_title) = &self.full_title {
            attrs.insert("fullTitle".to_string(), full_title.clone().into());
        }
        if let Some(file) = &self.file {
            attrs.insert("file".to_string(), file.clone().into());
        }
        if let Some(suite) = &self.suite {
            attrs.insert("testSuite".to_string(), suite.clone().into());
        }
        attrs
    }

    /// Error detail attributes; empty for passed cases.
    fn error_attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        if let Some(message) = &self.error_message {
            attrs.insert("test.case.errorMessage".to_string(), message.clone().into());
        }
        if let Some(stack) = &self.error_stack {
            attrs.insert("test.case.stackTrace".to_string(), stack.clone().into());
        }
        attrs
    }

    /// Exit code value: 0 for passed, 1 for failed.
    fn exit_code(&self) -> u64 {
        if self.failed { 1 } else { 0 }
    }
}

/// One gauge entry in the metrics payload.
#[derive(Debug, Serialize)]
pub struct MetricEntry {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub metric_type: &'static str,
    pub value: u64,
    pub timestamp: i64,
    pub attributes: Map<String, Value>,
}

/// One entry in the logs payload.
#[derive(Debug, Serialize)]
pub struct LogEntry {
    pub message: String,
    pub attributes: Map<String, Value>,
}

/// Shared block sent once per logs batch.
#[derive(Debug, Serialize)]
pub struct CommonBlock {
    pub timestamp: i64,
    pub attributes: Map<String, Value>,
}

/// An ordered, size-bounded group of records sent as a single request,
/// stamped when the batch is formed.
#[derive(Debug, Clone)]
pub struct Batch {
    pub records: Vec<TelemetryRecord>,
    /// Capture time, seconds since epoch
    pub timestamp: i64,
}

impl Batch {
    /// Encode the batch as the request body for the configured payload
    /// schema. Both encodings deliver the same logical attribute set per
    /// record; they differ only in whether the shared context attributes are
    /// inlined per entry or sent once per batch.
    pub fn to_body(&self, kind: TelemetryKind, common: &Map<String, Value>) -> Value {
        match kind {
            TelemetryKind::Metrics => self.to_metrics_body(common),
            TelemetryKind::Logs => self.to_logs_body(common),
        }
    }

    /// `[{"metrics": [...]}]` — a duration gauge and an exit-code gauge per
    /// record, each carrying the merged common and per-case attributes.
    fn to_metrics_body(&self, common: &Map<String, Value>) -> Value {
        let mut metrics = Vec::with_capacity(self.records.len() * 2);

        for record in &self.records {
            let mut duration_attrs = common.clone();
            duration_attrs.extend(record.identity_attributes());
            metrics.push(MetricEntry {
                name: "test.case.duration",
                metric_type: "gauge",
                value: record.duration_ms,
                timestamp: self.timestamp,
                attributes: duration_attrs,
            });

            let mut status_attrs = common.clone();
            status_attrs.extend(record.identity_attributes());
            status_attrs.extend(record.error_attributes());
            metrics.push(MetricEntry {
                name: "test.case.exit.code",
                metric_type: "gauge",
                value: record.exit_code(),
                timestamp: self.timestamp,
                attributes: status_attrs,
            });
        }

        serde_json::json!([{ "metrics": metrics }])
    }

    /// `[{"logs": [...], "common": {...}}]` — one entry per record with the
    /// shared context attributes sent once in the common block.
    fn to_logs_body(&self, common: &Map<String, Value>) -> Value {
        let logs: Vec<LogEntry> = self
            .records
            .iter()
            .map(|record| {
                let mut attributes = record.identity_attributes();
                attributes.insert(
                    "test.case.duration".to_string(),
                    record.duration_ms.into(),
                );
                attributes.insert("test.case.exit.code".to_string(), record.exit_code().into());
                attributes.extend(record.error_attributes());

                LogEntry {
                    message: record
                        .full_title
                        .clone()
                        .unwrap_or_else(|| record.title.clone()),
                    attributes,
                }
            })
            .collect();

        serde_json::json!([{
            "logs": logs,
            "common": CommonBlock {
                timestamp: self.timestamp,
                attributes: common.clone(),
            },
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, failed: bool) -> TelemetryRecord {
        TelemetryRecord {
            file: Some("a.ts".to_string()),
            title: title.to_string(),
            full_title: Some(format!("S {}", title)),
            suite: Some("S".to_string()),
            duration_ms: 12,
            failed,
            error_message: failed.then(|| "boom".to_string()),
            error_stack: None,
        }
    }

    fn common() -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert("github.branch".to_string(), "main".into());
        attrs
    }

    #[test]
    fn test_metrics_body_has_two_gauges_per_record() {
        let batch = Batch {
            records: vec![record("t1", false), record("t2", true)],
            timestamp: 1_700_000_000,
        };
        let body = batch.to_body(TelemetryKind::Metrics, &common());

        let metrics = body[0]["metrics"].as_array().unwrap();
        assert_eq!(metrics.len(), 4);
        assert_eq!(metrics[0]["name"], "test.case.duration");
        assert_eq!(metrics[0]["type"], "gauge");
        assert_eq!(metrics[0]["value"], 12);
        assert_eq!(metrics[0]["timestamp"], 1_700_000_000);
        assert_eq!(metrics[0]["attributes"]["github.branch"], "main");
        assert_eq!(metrics[0]["attributes"]["testSuite"], "S");
        assert_eq!(metrics[1]["name"], "test.case.exit.code");
        assert_eq!(metrics[1]["value"], 0);
        assert_eq!(metrics[3]["value"], 1);
    }

    #[test]
    fn test_metrics_error_detail_only_on_exit_code_gauge() {
        let batch = Batch {
            records: vec![record("t1", true)],
            timestamp: 1,
        };
        let body = batch.to_body(TelemetryKind::Metrics, &common());

        let metrics = body[0]["metrics"].as_array().unwrap();
        assert!(metrics[0]["attributes"]["test.case.errorMessage"].is_null());
        assert_eq!(metrics[1]["attributes"]["test.case.errorMessage"], "boom");
    }

    #[test]
    fn test_passed_record_never_carries_error_attributes() {
        let batch = Batch {
            records: vec![record("t1", false)],
            timestamp: 1,
        };
        let body = batch.to_body(TelemetryKind::Metrics, &common());

        for metric in body[0]["metrics"].as_array().unwrap() {
            assert!(metric["attributes"]["test.case.errorMessage"].is_null());
            assert!(metric["attributes"]["test.case.stackTrace"].is_null());
        }
    }

    #[test]
    fn test_logs_body_sends_context_once_per_batch() {
        let batch = Batch {
            records: vec![record("t1", false), record("t2", true)],
            timestamp: 42,
        };
        let body = batch.to_body(TelemetryKind::Logs, &common());

        let envelope = &body[0];
        assert_eq!(envelope["common"]["timestamp"], 42);
        assert_eq!(envelope["common"]["attributes"]["github.branch"], "main");

        let logs = envelope["logs"].as_array().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0]["message"], "S t1");
        assert_eq!(logs[0]["attributes"]["test.case.duration"], 12);
        assert_eq!(logs[0]["attributes"]["test.case.exit.code"], 0);
        assert!(logs[0]["attributes"]["github.branch"].is_null());
        assert_eq!(logs[1]["attributes"]["test.case.exit.code"], 1);
        assert_eq!(logs[1]["attributes"]["test.case.errorMessage"], "boom");
    }
}
