use super::errors::ReportError;
use super::timestamp::Timestamp;
use super::types::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Read access to prior performance measurements.
///
/// Implementations return every measurement of `case_id` taken at or before `time`,
/// skipping the run `exclude_test_run_id`, oldest first. Runs on different servers
/// may share a timestamp, so self-exclusion goes by run id and never by time.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch_history(
        &self,
        case_id: u64,
        time: Timestamp,
        exclude_test_run_id: u64,
    ) -> Result<Vec<HistoryPoint>, ReportError>;
}

/// A stored performance measurement keyed by the case it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMeasurement {
    pub case_id: u64,
    pub point: HistoryPoint,
}

/// History held in memory, typically the performance rows of every run in an export.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    measurements: Vec<StoredMeasurement>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every performance row becomes a measurement; other result types are ignored.
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let measurements = rows
            .iter()
            .filter(|row| ResultType::parse(&row.result_type) == Some(ResultType::Performance))
            .map(|row| StoredMeasurement {
                case_id: row.case_id,
                point: HistoryPoint {
                    time: row.timestamp,
                    server_id: row.server_id,
                    server_name: row.server_name.clone(),
                    min_fps: row.min_fps.clone(),
                    avg_fps: row.avg_fps.clone(),
                    mean_fps: row.mean_fps.clone(),
                    max_fps: row.max_fps.clone(),
                    test_run_id: row.test_run_id,
                },
            })
            .collect();
        Self { measurements }
    }

    pub fn push(&mut self, case_id: u64, point: HistoryPoint) {
        self.measurements.push(StoredMeasurement { case_id, point });
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

#[async_trait]
impl HistorySource for InMemoryHistory {
    async fn fetch_history(
        &self,
        case_id: u64,
        time: Timestamp,
        exclude_test_run_id: u64,
    ) -> Result<Vec<HistoryPoint>, ReportError> {
        let mut points: Vec<HistoryPoint> = self
            .measurements
            .iter()
            .filter(|m| m.case_id == case_id)
            .filter(|m| m.point.time <= time && m.point.test_run_id != exclude_test_run_id)
            .map(|m| m.point.clone())
            .collect();
        points.sort_by_key(|p| p.time);
        Ok(points)
    }
}

/// Fills in the history of performance records.
///
/// Fetch failures degrade to an empty history: a record without trend context still
/// renders. The filter/order contract is re-applied to whatever the source returns,
/// since the reconciler relies on it.
pub struct HistoryAssembler<'a> {
    source: &'a dyn HistorySource,
    degraded: AtomicU64,
}

impl<'a> HistoryAssembler<'a> {
    pub fn new(source: &'a dyn HistorySource) -> Self {
        Self {
            source,
            degraded: AtomicU64::new(0),
        }
    }

    pub async fn assemble(&self, identity: &CaseIdentity) -> Vec<HistoryPoint> {
        let fetched = self
            .source
            .fetch_history(identity.case_id, identity.time, identity.test_run_id)
            .await;

        let mut points = match fetched {
            Ok(points) => points,
            Err(e) => {
                self.degraded.fetch_add(1, Ordering::Relaxed);
                warn!(
                    case.id = identity.case_id,
                    test_run.id = identity.test_run_id,
                    error = %e,
                    "History fetch failed, rendering without trend data"
                );
                return Vec::new();
            }
        };

        let returned = points.len();
        points.retain(|p| p.time <= identity.time && p.test_run_id != identity.test_run_id);
        if points.len() != returned {
            debug!(
                case.id = identity.case_id,
                dropped = returned - points.len(),
                "History source returned measurements outside the requested window"
            );
        }
        points.sort_by_key(|p| p.time);
        points
    }

    /// Number of fetches that failed and were replaced by an empty history
    pub fn degraded_count(&self) -> u64 {
        self.degraded.load(Ordering::Relaxed)
    }
}
