//! Domain error types for the telemetry exporter.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Report file missing, unreadable, or not valid JSON. Fatal: aborts the run.
    #[error("Input unavailable: {0}")]
    InputUnavailable(String),

    /// Parsed report matches neither supported schema. Fatal: aborts the run.
    #[error("Unrecognized report schema: {0}")]
    SchemaInvalid(String),

    /// A batch delivery failed (transport error or non-success status).
    /// Non-fatal: contained within the dispatch loop.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Local file system operation failed (artifact archival).
    #[error("File system error: {0}")]
    FileSystem(String),
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Delivery(err.to_string())
    }
}
