//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// HTTP header name carrying the telemetry API credential.
pub const API_KEY_HEADER: &str = "Api-Key";

/// Default values applied when the corresponding variable is unset.
pub mod defaults {
    /// Metric ingestion endpoint.
    pub const METRIC_ENDPOINT_URL: &str = "https://metric-api.eu.newrelic.com/metric/v1";
    /// Log ingestion endpoint.
    pub const LOG_ENDPOINT_URL: &str = "https://log-api.eu.newrelic.com/log/v1";
    /// Safety margin under the endpoint's payload-size limit, chosen
    /// empirically against 413 responses. Counted in records, not bytes.
    pub const MAX_RECORDS_PER_BATCH: usize = 70;
    /// Per-request timeout in seconds.
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;
    /// Directory for archived raw report files.
    pub const ARTIFACT_DIR: &str = "test-artifacts";
}

/// Which telemetry payload schema to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryKind {
    /// `[{"metrics": [...]}]` — two gauge entries per test case.
    Metrics,
    /// `[{"logs": [...], "common": {...}}]` — one log entry per test case,
    /// shared context sent once per batch.
    Logs,
}

impl TelemetryKind {
    /// Parse from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "metrics" | "metric" => Some(Self::Metrics),
            "logs" | "log" => Some(Self::Logs),
            _ => None,
        }
    }

    /// Default ingestion endpoint for this kind.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Metrics => defaults::METRIC_ENDPOINT_URL,
            Self::Logs => defaults::LOG_ENDPOINT_URL,
        }
    }
}

impl std::fmt::Display for TelemetryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Metrics => write!(f, "metrics"),
            Self::Logs => write!(f, "logs"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telemetry API credential sent in the `Api-Key` header
    pub license_key: SecretString,
    /// Path to the test-run report file
    pub report_file: PathBuf,
    /// Telemetry ingestion endpoint URL
    pub endpoint_url: String,
    /// Payload schema to emit
    pub telemetry_kind: TelemetryKind,
    /// Maximum records per outbound batch
    pub max_records_per_batch: usize,
    /// Process exit code used when the run aborts (0 or 1)
    pub abort_exit_code: i32,
    /// Verbose logging (raw report and request payloads at debug level)
    pub verbose_log: bool,
    /// Whether to archive the raw report file
    pub upload_artifact: bool,
    /// Directory receiving archived report files
    pub artifact_dir: PathBuf,
    /// Job identifier override (defaults to GITHUB_JOB at capture time)
    pub job_id: Option<String>,
    /// Optional metric identifier added to the common attributes
    pub metric_id: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TTE_LICENSE_KEY`: telemetry API credential - REQUIRED
    /// - `TTE_REPORT_FILE`: path to the test-run report - REQUIRED
    /// - `TTE_TELEMETRY_KIND`: `metrics` or `logs` (default: metrics)
    /// - `TTE_ENDPOINT_URL`: ingestion URL (default: per-kind endpoint)
    /// - `TTE_MAX_RECORDS_PER_BATCH`: records per request (default: 70)
    /// - `TTE_FAIL_PIPELINE`: `1` makes an aborted run exit 1 (default: 0)
    /// - `TTE_VERBOSE_LOG`: `1` enables debug payload logging
    /// - `TTE_UPLOAD_ARTIFACT`: `1` archives the raw report file
    /// - `TTE_ARTIFACT_DIR`: archive directory (default: test-artifacts)
    /// - `TTE_JOB_ID`: job identifier override (default: GITHUB_JOB)
    /// - `TTE_METRIC_ID`: optional `metricId` common attribute
    /// - `TTE_REQUEST_TIMEOUT_SECS`: request timeout (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let license_key: SecretString = env::var("TTE_LICENSE_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("TTE_LICENSE_KEY"))?
            .into();

        let report_file = env::var("TTE_REPORT_FILE")
            .map(PathBuf::from)
            .map_err(|_| ConfigError::MissingEnvVar("TTE_REPORT_FILE"))?;

        let telemetry_kind = match env::var("TTE_TELEMETRY_KIND") {
            Ok(s) => TelemetryKind::parse(&s).ok_or(ConfigError::InvalidValue(
                "TTE_TELEMETRY_KIND must be 'metrics' or 'logs'",
            ))?,
            Err(_) => TelemetryKind::Metrics,
        };

        let endpoint_url = env::var("TTE_ENDPOINT_URL")
            .unwrap_or_else(|_| telemetry_kind.default_endpoint().to_string());

        let max_records_per_batch = env::var("TTE_MAX_RECORDS_PER_BATCH")
            .unwrap_or_else(|_| defaults::MAX_RECORDS_PER_BATCH.to_string())
            .parse::<usize>()
            .map_err(|_| {
                ConfigError::InvalidValue("TTE_MAX_RECORDS_PER_BATCH must be a valid number")
            })?;
        if max_records_per_batch == 0 {
            return Err(ConfigError::InvalidValue(
                "TTE_MAX_RECORDS_PER_BATCH must be at least 1",
            ));
        }

        let request_timeout_secs = env::var("TTE_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults::REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("TTE_REQUEST_TIMEOUT_SECS must be a valid number")
            })?;

        let artifact_dir = env::var("TTE_ARTIFACT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(defaults::ARTIFACT_DIR));

        let config = Config {
            license_key,
            report_file,
            endpoint_url,
            telemetry_kind,
            max_records_per_batch,
            abort_exit_code: if flag_enabled("TTE_FAIL_PIPELINE") { 1 } else { 0 },
            verbose_log: flag_enabled("TTE_VERBOSE_LOG"),
            upload_artifact: flag_enabled("TTE_UPLOAD_ARTIFACT"),
            artifact_dir,
            job_id: env::var("TTE_JOB_ID").ok().filter(|s| !s.is_empty()),
            metric_id: env::var("TTE_METRIC_ID").ok().filter(|s| !s.is_empty()),
            request_timeout: Duration::from_secs(request_timeout_secs),
        };

        Ok(config)
    }
}

/// A `1` value enables the flag; anything else (including unset) disables it.
fn flag_enabled(var: &str) -> bool {
    env::var(var).map(|v| v == "1").unwrap_or(false)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_kind_parsing() {
        assert_eq!(TelemetryKind::parse("metrics"), Some(TelemetryKind::Metrics));
        assert_eq!(TelemetryKind::parse("Metric"), Some(TelemetryKind::Metrics));
        assert_eq!(TelemetryKind::parse("logs"), Some(TelemetryKind::Logs));
        assert_eq!(TelemetryKind::parse("log"), Some(TelemetryKind::Logs));
        assert_eq!(TelemetryKind::parse("traces"), None);
    }

    #[test]
    fn test_default_endpoints_differ_per_kind() {
        assert_ne!(
            TelemetryKind::Metrics.default_endpoint(),
            TelemetryKind::Logs.default_endpoint()
        );
        assert!(TelemetryKind::Metrics.default_endpoint().contains("metric"));
        assert!(TelemetryKind::Logs.default_endpoint().contains("log"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TelemetryKind::Metrics.to_string(), "metrics");
        assert_eq!(TelemetryKind::Logs.to_string(), "logs");
    }
}
