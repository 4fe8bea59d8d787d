// Testboard Library - test-run result trees and chart reconciliation
// This exposes the core components for testing and integration

pub mod chart;
pub mod cli;
pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod observability;
pub mod results;
pub mod telemetry;

// Re-export key types for easy access
pub use chart::{ChartBatch, ChartPoint, ChartSelection, Dataset, PointValue, TimeSeriesReconciler};
pub use config::{config, init_config, TestboardConfig};
#[cfg(feature = "database")]
pub use database::SqliteResultStore;
pub use observability::{report_metrics, BuildCounters, BuildStats, OperationTimer};
pub use results::{
    CaseOutcome, CategoryNode, DisplayOptions, FileNode, HistoryAssembler, HistoryPoint,
    HistorySource, InMemoryHistory, RejectedRow, ReportBuilder, ReportError, ReportOutcome,
    ResultRow, ResultTree, RowClassifier, TestCaseRecord, TreeNode, TreeSummary,
};
pub use telemetry::{create_build_span, generate_build_id, init_telemetry};
