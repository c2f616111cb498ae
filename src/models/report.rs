//! Parsed test-run report supporting both observed report schemas.

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::test_case::TestCase;

/// The full parsed report. Two shapes are observed in practice and both must
/// validate: a split pass/fail listing and a unified listing where status is
/// derived from each case's error detail.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Report {
    /// `{"passes": [...], "failures": [...]}`. The failures list can contain
    /// entries that are not real tests (e.g. failed hooks), so the two lists
    /// are neither exhaustive nor assumed disjoint.
    Split {
        passes: Vec<TestCase>,
        failures: Vec<TestCase>,
    },
    /// `{"tests": [...]}`.
    Unified { tests: Vec<TestCase> },
}

impl Report {
    /// Parse raw report bytes.
    ///
    /// Bytes that are not valid JSON map to `InputUnavailable` (the report is
    /// unreadable); a valid document whose top level matches neither schema
    /// maps to `SchemaInvalid`. A structurally invalid report is rejected
    /// entirely, never partially parsed. An empty test set is valid.
    pub fn parse(raw: &[u8]) -> AppResult<Report> {
        Report::from_value(Report::parse_document(raw)?)
    }

    /// First stage: the bytes must be a valid JSON document.
    pub fn parse_document(raw: &[u8]) -> AppResult<serde_json::Value> {
        serde_json::from_slice(raw)
            .map_err(|e| AppError::InputUnavailable(format!("report is not valid JSON: {}", e)))
    }

    /// Second stage: the document must match one of the supported schemas.
    pub fn from_value(value: serde_json::Value) -> AppResult<Report> {
        serde_json::from_value(value).map_err(|e| {
            AppError::SchemaInvalid(format!(
                "report has neither 'passes'/'failures' nor 'tests' populated: {}",
                e
            ))
        })
    }

    /// All cases in stable input order: split reports yield passes then
    /// failures, each in original order; unified reports yield tests as-is.
    pub fn cases(&self) -> Box<dyn Iterator<Item = &TestCase> + '_> {
        match self {
            Report::Split { passes, failures } => Box::new(passes.iter().chain(failures.iter())),
            Report::Unified { tests } => Box::new(tests.iter()),
        }
    }

    /// Total number of cases.
    pub fn len(&self) -> usize {
        match self {
            Report::Split { passes, failures } => passes.len() + failures.len(),
            Report::Unified { tests } => tests.len(),
        }
    }

    /// Whether the report holds no cases at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_split_shape() {
        let raw = br#"{"passes":[{"title":"p1"}],"failures":[{"title":"f1"}]}"#;
        let report = Report::parse(raw).unwrap();
        assert!(matches!(report, Report::Split { .. }));
        let titles: Vec<_> = report.cases().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["p1", "f1"]);
    }

    #[test]
    fn test_parses_unified_shape() {
        let raw = br#"{"tests":[{"title":"t1"},{"title":"t2"}]}"#;
        let report = Report::parse(raw).unwrap();
        assert!(matches!(report, Report::Unified { .. }));
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_empty_arrays_are_valid() {
        let report = Report::parse(br#"{"passes":[],"failures":[]}"#).unwrap();
        assert!(report.is_empty());
        let report = Report::parse(br#"{"tests":[]}"#).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_invalid_json_is_input_unavailable() {
        let err = Report::parse(b"not json at all").unwrap_err();
        assert!(matches!(err, AppError::InputUnavailable(_)));
    }

    #[test]
    fn test_unknown_shape_is_schema_invalid() {
        let err = Report::parse(br#"{"stats":{"tests":3}}"#).unwrap_err();
        assert!(matches!(err, AppError::SchemaInvalid(_)));
    }

    #[test]
    fn test_split_shape_requires_both_keys() {
        let err = Report::parse(br#"{"passes":[]}"#).unwrap_err();
        assert!(matches!(err, AppError::SchemaInvalid(_)));
    }

    #[test]
    fn test_null_lists_are_rejected() {
        let err = Report::parse(br#"{"passes":null,"failures":null}"#).unwrap_err();
        assert!(matches!(err, AppError::SchemaInvalid(_)));
        let err = Report::parse(br#"{"tests":null}"#).unwrap_err();
        assert!(matches!(err, AppError::SchemaInvalid(_)));
    }

    #[test]
    fn test_extra_top_level_keys_are_ignored() {
        let raw = br#"{"tests":[{"title":"t1"}],"stats":{"duration":9}}"#;
        assert_eq!(Report::parse(raw).unwrap().len(), 1);
    }
}
