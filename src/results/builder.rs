use super::classify::RowClassifier;
use super::errors::ReportError;
use super::history::{HistoryAssembler, HistorySource};
use super::tree::NO_RESULTS_LABEL;
use super::types::*;
use crate::observability::{report_metrics, BuildStats};
use crate::telemetry::{create_build_span, generate_build_id};
use tracing::{debug, info, warn, Instrument};

/// A row that could not be placed in the tree
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// Position of the row in the input sequence
    pub row_index: usize,
    pub case_id: u64,
    pub filename: String,
    pub error: ReportError,
}

#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub build_id: String,
    pub tree: ResultTree,
    pub rejected: Vec<RejectedRow>,
    pub stats: BuildStats,
}

/// Folds the rows of one test run into a fresh report tree.
///
/// Rows are taken in the order given; callers sort by `(case_id, step_id)` first.
/// A malformed or unknown row is rejected and reported while the rest of the run
/// still builds.
pub struct ReportBuilder<'a> {
    history: &'a dyn HistorySource,
    no_results_label: String,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(history: &'a dyn HistorySource) -> Self {
        Self {
            history,
            no_results_label: NO_RESULTS_LABEL.to_string(),
        }
    }

    pub fn with_no_results_label(mut self, label: &str) -> Self {
        self.no_results_label = label.to_string();
        self
    }

    pub async fn build(&self, rows: &[ResultRow]) -> ReportOutcome {
        let build_id = generate_build_id();
        let span = create_build_span(&build_id, rows.len());
        self.build_inner(build_id, rows).instrument(span).await
    }

    async fn build_inner(&self, build_id: String, rows: &[ResultRow]) -> ReportOutcome {
        let assembler = HistoryAssembler::new(self.history);
        let mut tree = ResultTree::new();
        let mut rejected = Vec::new();
        let mut stats = BuildStats::default();

        for (row_index, row) in rows.iter().enumerate() {
            let mut record = match RowClassifier::classify(row) {
                Ok(record) => record,
                Err(error) => {
                    rejected.push(reject(row_index, row, error));
                    continue;
                }
            };

            if let CaseOutcome::Performance(perf) = &mut record.outcome {
                perf.history = assembler.assemble(&record.identity).await;
            }

            match tree.insert_record(record) {
                Ok(file) => {
                    stats.rows_accepted += 1;
                    debug!(
                        row.index = row_index,
                        file = %file.name,
                        file.success = file.success,
                        "Row attached"
                    );
                }
                Err(error) => rejected.push(reject(row_index, row, error)),
            }
        }

        stats.rows_rejected = rejected.len() as u64;
        stats.history_degraded = assembler.degraded_count();

        if tree.is_empty() {
            info!("No results to show, substituting placeholder");
            tree = ResultTree::no_results(&self.no_results_label);
        }

        report_metrics().record_build(&stats);
        info!(
            rows.accepted = stats.rows_accepted,
            rows.rejected = stats.rows_rejected,
            history.degraded = stats.history_degraded,
            tree.success = tree.success(),
            "Report tree built"
        );

        ReportOutcome {
            build_id,
            tree,
            rejected,
            stats,
        }
    }
}

fn reject(row_index: usize, row: &ResultRow, error: ReportError) -> RejectedRow {
    warn!(
        row.index = row_index,
        case.id = row.case_id,
        path = %row.filename,
        error = %error,
        "Rejected result row"
    );
    RejectedRow {
        row_index,
        case_id: row.case_id,
        filename: row.filename.clone(),
        error,
    }
}
