//! Test case model representing one test execution outcome from the report.

use serde::Deserialize;

/// Error detail attached to a failed test case.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
}

impl TestError {
    /// An error counts only when at least one field is populated.
    pub fn is_populated(&self) -> bool {
        self.message.as_deref().is_some_and(|m| !m.is_empty())
            || self.stack.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// One test execution outcome. Constructed once from the parsed report,
/// immutable thereafter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Source path of the test
    #[serde(default)]
    pub file: Option<String>,
    /// Leaf test name
    pub title: String,
    /// Fully qualified name including describe blocks
    #[serde(default)]
    pub full_title: Option<String>,
    /// Elapsed milliseconds
    #[serde(default)]
    pub duration: u64,
    /// Error detail; a populated error marks the case as failed
    #[serde(default)]
    pub err: Option<TestError>,
}

impl TestCase {
    /// A case failed iff its error object carries at least one populated field.
    pub fn is_failed(&self) -> bool {
        self.err.as_ref().is_some_and(TestError::is_populated)
    }

    /// Suite name: the full title with the literal leaf title removed once,
    /// trimmed of surrounding whitespace. Absent when there is no full title.
    pub fn suite(&self) -> Option<String> {
        self.full_title
            .as_deref()
            .map(|full| full.replacen(&self.title, "", 1).trim().to_string())
    }

    /// Error message, when populated.
    pub fn error_message(&self) -> Option<&str> {
        self.err
            .as_ref()
            .and_then(|e| e.message.as_deref())
            .filter(|m| !m.is_empty())
    }

    /// Stack trace, when populated.
    pub fn error_stack(&self) -> Option<&str> {
        self.err
            .as_ref()
            .and_then(|e| e.stack.as_deref())
            .filter(|s| !s.is_empty())
    }
}
