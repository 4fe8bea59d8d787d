use crate::results::timestamp::{self, Timestamp};
use crate::results::{HistoryPoint, HistorySource, RawMetric, ReportError, ResultRow};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{migrate::MigrateDatabase, Row, SqlitePool};
use tracing::{debug, info};

/// Rows of one test run across every result table, ordered the way the tree builder
/// expects them.
const RUN_ROWS_QUERY: &str = r#"
SELECT p.id AS id, r.timestamp AS timestamp, r.server_id AS server_id,
       s.server_name AS server_name, p.test_run_id AS test_run_id, p.file_id AS file_id,
       f.filename AS filename, p.case_id AS case_id, 'performance' AS result_type,
       c.case_name AS case_name, p.step_id AS step_id, st.step_name AS step_name,
       NULL AS success, NULL AS output_image, NULL AS diff_image, NULL AS baseline_image,
       p.min_fps AS min_fps, p.max_fps AS max_fps, p.mean_fps AS mean_fps, p.avg_fps AS avg_fps,
       NULL AS stdout, NULL AS stderr, NULL AS text_output, NULL AS text_baseline, NULL AS text_diff
FROM performance_results p
JOIN test_runs r ON p.test_run_id = r.id
JOIN servers s ON r.server_id = s.id
JOIN test_files f ON p.file_id = f.id
JOIN test_cases c ON p.case_id = c.id
JOIN test_steps st ON p.step_id = st.id
WHERE r.id = ?1
UNION ALL
SELECT g.id, r.timestamp, r.server_id, s.server_name,
       g.test_run_id, g.file_id, f.filename, g.case_id,
       'rendering', c.case_name, g.step_id, st.step_name,
       g.success, g.output_image, g.diff_image, b.image,
       NULL, NULL, NULL, NULL,
       NULL, NULL, NULL, NULL, NULL
FROM rendering_results g
JOIN test_runs r ON g.test_run_id = r.id
JOIN servers s ON r.server_id = s.id
JOIN test_files f ON g.file_id = f.id
JOIN test_cases c ON g.case_id = c.id
JOIN test_steps st ON g.step_id = st.id
LEFT JOIN rendering_baselines b ON g.case_id = b.case_id AND g.step_id = b.step_id
WHERE r.id = ?1
UNION ALL
SELECT o.id, r.timestamp, r.server_id, s.server_name,
       o.test_run_id, o.file_id, f.filename, o.case_id,
       'console', c.case_name, o.step_id, st.step_name,
       o.success, NULL, NULL, NULL,
       NULL, NULL, NULL, NULL,
       NULL, NULL, o.output, o.baseline, o.diff
FROM console_results o
JOIN test_runs r ON o.test_run_id = r.id
JOIN servers s ON r.server_id = s.id
JOIN test_files f ON o.file_id = f.id
JOIN test_cases c ON o.case_id = c.id
JOIN test_steps st ON o.step_id = st.id
WHERE r.id = ?1
UNION ALL
SELECT u.id, r.timestamp, r.server_id, s.server_name,
       u.test_run_id, u.file_id, f.filename, u.case_id,
       'custom', c.case_name, u.step_id, st.step_name,
       u.success, NULL, NULL, NULL,
       NULL, NULL, NULL, NULL,
       NULL, NULL, u.output, u.baseline, u.diff
FROM custom_results u
JOIN test_runs r ON u.test_run_id = r.id
JOIN servers s ON r.server_id = s.id
JOIN test_files f ON u.file_id = f.id
JOIN test_cases c ON u.case_id = c.id
JOIN test_steps st ON u.step_id = st.id
WHERE r.id = ?1
UNION ALL
SELECT e.id, r.timestamp, r.server_id, s.server_name,
       e.test_run_id, e.file_id, f.filename, e.case_id,
       'error', c.case_name, e.step_id, st.step_name,
       NULL, NULL, NULL, NULL,
       NULL, NULL, NULL, NULL,
       e.stdout, e.stderr, NULL, NULL, NULL
FROM error_results e
JOIN test_runs r ON e.test_run_id = r.id
JOIN servers s ON r.server_id = s.id
JOIN test_files f ON e.file_id = f.id
JOIN test_cases c ON e.case_id = c.id
JOIN test_steps st ON e.step_id = st.id
WHERE r.id = ?1
ORDER BY case_id ASC, step_id ASC
"#;

const HISTORY_QUERY: &str = r#"
SELECT p.min_fps, p.avg_fps, p.max_fps, p.mean_fps,
       r.timestamp, r.server_id, s.server_name, p.test_run_id
FROM performance_results p
JOIN test_runs r ON p.test_run_id = r.id
JOIN servers s ON r.server_id = s.id
WHERE p.case_id = ?1 AND r.timestamp <= ?2 AND p.test_run_id != ?3
ORDER BY r.timestamp ASC
"#;

/// Read access to a SQLite result store
pub struct SqliteResultStore {
    pool: SqlitePool,
}

impl SqliteResultStore {
    /// Open the store, creating the file and schema when `auto_migrate` is set
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        auto_migrate: bool,
    ) -> Result<Self> {
        if auto_migrate && !sqlx::Sqlite::database_exists(database_url).await? {
            info!("Creating database at {}", database_url);
            sqlx::Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to open result store {database_url}"))?;

        if auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations completed");
        }

        Ok(Self { pool })
    }

    /// Get database pool for queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Highest test run id in the store
    pub async fn latest_run_id(&self) -> Result<Option<u64>> {
        let row = sqlx::query("SELECT MAX(id) AS id FROM test_runs")
            .fetch_one(&self.pool)
            .await?;
        let id: Option<i64> = row.try_get("id")?;
        Ok(id.map(|id| id as u64))
    }

    /// Every result row of `test_run_id`, ordered by `(case_id, step_id)`
    pub async fn fetch_run_rows(&self, test_run_id: u64) -> Result<Vec<ResultRow>> {
        let rows = sqlx::query(RUN_ROWS_QUERY)
            .bind(test_run_id as i64)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch rows of test run {test_run_id}"))?;

        debug!(test_run.id = test_run_id, rows = rows.len(), "Fetched run rows");
        rows.iter().map(result_row).collect()
    }
}

#[async_trait]
impl HistorySource for SqliteResultStore {
    async fn fetch_history(
        &self,
        case_id: u64,
        time: Timestamp,
        exclude_test_run_id: u64,
    ) -> Result<Vec<HistoryPoint>, ReportError> {
        let unavailable = |reason: String| ReportError::HistoryUnavailable { case_id, reason };

        let rows = sqlx::query(HISTORY_QUERY)
            .bind(case_id as i64)
            .bind(timestamp::format(&time))
            .bind(exclude_test_run_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        rows.iter()
            .map(|row| history_point(row).map_err(|e| unavailable(e.to_string())))
            .collect()
    }
}

fn result_row(row: &SqliteRow) -> Result<ResultRow> {
    Ok(ResultRow {
        id: row.try_get::<Option<i64>, _>("id")?.map(|id| id as u64),
        test_run_id: row.try_get::<i64, _>("test_run_id")? as u64,
        timestamp: parse_time(row)?,
        server_id: row.try_get::<i64, _>("server_id")? as u64,
        server_name: row.try_get("server_name")?,
        file_id: row.try_get::<Option<i64>, _>("file_id")?.map(|id| id as u64),
        filename: row.try_get("filename")?,
        case_id: row.try_get::<i64, _>("case_id")? as u64,
        case_name: row.try_get("case_name")?,
        step_id: row.try_get::<i64, _>("step_id")? as u64,
        step_name: row.try_get("step_name")?,
        result_type: row.try_get("result_type")?,
        success: row.try_get("success")?,
        output_image: row.try_get("output_image")?,
        diff_image: row.try_get("diff_image")?,
        baseline_image: row.try_get("baseline_image")?,
        min_fps: raw_metric(row, "min_fps"),
        max_fps: raw_metric(row, "max_fps"),
        mean_fps: raw_metric(row, "mean_fps"),
        avg_fps: raw_metric(row, "avg_fps"),
        stdout: row.try_get("stdout")?,
        stderr: row.try_get("stderr")?,
        text_output: row.try_get("text_output")?,
        text_baseline: row.try_get("text_baseline")?,
        text_diff: row.try_get("text_diff")?,
    })
}

fn history_point(row: &SqliteRow) -> Result<HistoryPoint> {
    Ok(HistoryPoint {
        time: parse_time(row)?,
        server_id: row.try_get::<i64, _>("server_id")? as u64,
        server_name: row.try_get("server_name")?,
        min_fps: raw_metric(row, "min_fps"),
        avg_fps: raw_metric(row, "avg_fps"),
        mean_fps: raw_metric(row, "mean_fps"),
        max_fps: raw_metric(row, "max_fps"),
        test_run_id: row.try_get::<i64, _>("test_run_id")? as u64,
    })
}

fn parse_time(row: &SqliteRow) -> Result<Timestamp> {
    let raw: String = row.try_get("timestamp")?;
    timestamp::parse(&raw).map_err(|e| anyhow!("Unreadable timestamp {raw:?}: {e}"))
}

/// Frame rates were written as REAL by newer runners and as TEXT by older ones.
fn raw_metric(row: &SqliteRow, column: &str) -> Option<RawMetric> {
    match row.try_get::<Option<f64>, _>(column) {
        Ok(value) => value.map(RawMetric::Number),
        Err(_) => row
            .try_get::<Option<String>, _>(column)
            .ok()
            .flatten()
            .map(RawMetric::Text),
    }
}
