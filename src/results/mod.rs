//! Folding flat result rows into the category/file/testcase report tree.

pub mod blob;
pub mod builder;
pub mod classify;
pub mod errors;
pub mod history;
pub mod options;
pub mod summary;
pub mod timestamp;
pub mod tree;
pub mod types;

pub use builder::{RejectedRow, ReportBuilder, ReportOutcome};
pub use classify::RowClassifier;
pub use errors::{PathConflict, ReportError};
pub use history::{HistoryAssembler, HistorySource, InMemoryHistory, StoredMeasurement};
pub use options::{DisplayOptions, OptionSet, DEFAULT_PROPERTY};
pub use summary::{format_summary_report, TreeSummary};
pub use timestamp::Timestamp;
pub use tree::NO_RESULTS_LABEL;
pub use types::*;
