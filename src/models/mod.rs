//! Domain models for the telemetry exporter.

pub mod github_context;
pub mod report;
pub mod telemetry;
pub mod test_case;

// Re-export commonly used types
pub use github_context::GitHubContext;
pub use report::Report;
pub use telemetry::{Batch, CommonBlock, LogEntry, MetricEntry, TelemetryRecord};
pub use test_case::{TestCase, TestError};
