use crate::cli::SourceArgs;
use crate::config::ReportConfig;
use crate::observability::OperationTimer;
use crate::results::{
    HistorySource, InMemoryHistory, RejectedRow, ReportBuilder, ReportOutcome, ResultRow,
};
use anyhow::{bail, Context, Result};
use tracing::info;

pub mod chart;
pub mod options;
pub mod report;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Rows of the selected test run plus the history they are charted against
pub struct LoadedRun {
    pub test_run_id: Option<u64>,
    pub rows: Vec<ResultRow>,
    pub history: Box<dyn HistorySource>,
}

pub async fn load_run(source: &SourceArgs) -> Result<LoadedRun> {
    if let Some(url) = database_url(source) {
        return load_from_database(url, source.run).await;
    }

    let Some(path) = &source.input else {
        bail!("No result source given; pass --input <rows.json>");
    };
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let all_rows: Vec<ResultRow> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse result rows from {}", path.display()))?;

    Ok(select_run(all_rows, source.run))
}

/// Keep the rows of `run` (default: the newest run) in `(case_id, step_id)` order.
/// Every performance row of every run stays available as history.
pub fn select_run(all_rows: Vec<ResultRow>, run: Option<u64>) -> LoadedRun {
    let history = InMemoryHistory::from_rows(&all_rows);
    let test_run_id = run.or_else(|| all_rows.iter().map(|row| row.test_run_id).max());

    let mut rows: Vec<ResultRow> = all_rows
        .into_iter()
        .filter(|row| Some(row.test_run_id) == test_run_id)
        .collect();
    rows.sort_by_key(|row| (row.case_id, row.step_id));

    info!(
        test_run.id = ?test_run_id,
        rows = rows.len(),
        history.measurements = history.len(),
        "Selected test run"
    );

    LoadedRun {
        test_run_id,
        rows,
        history: Box::new(history),
    }
}

#[cfg(feature = "database")]
fn database_url(source: &SourceArgs) -> Option<&str> {
    source.database.as_deref()
}

#[cfg(not(feature = "database"))]
fn database_url(_source: &SourceArgs) -> Option<&str> {
    None
}

#[cfg(not(feature = "database"))]
async fn load_from_database(_url: &str, _run: Option<u64>) -> Result<LoadedRun> {
    bail!("Database support not enabled; rebuild with --features database")
}

#[cfg(feature = "database")]
async fn load_from_database(url: &str, run: Option<u64>) -> Result<LoadedRun> {
    use crate::database::SqliteResultStore;

    let max_connections = crate::config::config()?
        .database
        .as_ref()
        .map(|db| db.max_connections)
        .unwrap_or(5);
    let store = SqliteResultStore::connect(url, max_connections, false).await?;

    let test_run_id = match run {
        Some(run) => Some(run),
        None => store.latest_run_id().await?,
    };
    let rows = match test_run_id {
        Some(run) => store.fetch_run_rows(run).await?,
        None => Vec::new(),
    };

    Ok(LoadedRun {
        test_run_id,
        rows,
        history: Box::new(store),
    })
}

/// Build the tree of a loaded run, reporting rejected rows on stderr
pub async fn build_tree(run: &LoadedRun, report: &ReportConfig) -> ReportOutcome {
    let timer = OperationTimer::new("report_build");
    let outcome = ReportBuilder::new(run.history.as_ref())
        .with_no_results_label(&report.no_results_label)
        .build(&run.rows)
        .await;
    timer.finish();

    print_rejections(&outcome.rejected);
    outcome
}

fn print_rejections(rejected: &[RejectedRow]) {
    if rejected.is_empty() {
        return;
    }
    eprintln!("⚠️  {} row(s) rejected:", rejected.len());
    for row in rejected {
        eprintln!(
            "   row {} (case {}, {}): {}",
            row.row_index, row.case_id, row.filename, row.error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(run: u64, case_id: u64, step_id: u64) -> ResultRow {
        serde_json::from_value(serde_json::json!({
            "test_run_id": run,
            "timestamp": format!("2016-01-0{run} 00:00:00"),
            "server_id": 1,
            "server_name": "linux",
            "filename": "a/b.test",
            "case_id": case_id,
            "case_name": format!("case{case_id}"),
            "step_id": step_id,
            "result_type": "performance",
            "avg_fps": 10.0
        }))
        .unwrap()
    }

    #[test]
    fn test_select_run_defaults_to_newest_and_sorts() {
        let rows = vec![row(1, 1, 1), row(2, 2, 1), row(2, 1, 2), row(2, 1, 1)];
        let run = select_run(rows, None);
        assert_eq!(run.test_run_id, Some(2));
        let keys: Vec<(u64, u64)> = run.rows.iter().map(|r| (r.case_id, r.step_id)).collect();
        assert_eq!(keys, vec![(1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_select_unknown_run_is_empty() {
        let run = select_run(vec![row(1, 1, 1)], Some(7));
        assert_eq!(run.test_run_id, Some(7));
        assert!(run.rows.is_empty());
    }
}
