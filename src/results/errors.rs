use thiserror::Error;

/// Errors raised while folding result rows into a report tree
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReportError {
    #[error("Malformed path '{path}': {conflict}")]
    MalformedPath { path: String, conflict: PathConflict },

    #[error("Unknown result type '{result_type}' for case {case_id}")]
    UnknownVariant { result_type: String, case_id: u64 },

    #[error("History unavailable for case {case_id}: {reason}")]
    HistoryUnavailable { case_id: u64, reason: String },
}

/// How a row's path disagrees with the tree built so far
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathConflict {
    #[error("segment '{segment}' is a test file but the path continues below it")]
    FileWhereCategoryExpected { segment: String },

    #[error("segment '{segment}' is a category but the path ends there")]
    CategoryWhereFileExpected { segment: String },

    #[error("path contains an empty segment")]
    EmptySegment,
}

impl ReportError {
    pub fn malformed_path(path: &str, conflict: PathConflict) -> Self {
        ReportError::MalformedPath {
            path: path.to_string(),
            conflict,
        }
    }
}
