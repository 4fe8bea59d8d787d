use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Process-wide counters for report builds
#[derive(Debug, Default)]
pub struct BuildCounters {
    pub trees_built: AtomicU64,
    pub rows_accepted: AtomicU64,
    pub rows_rejected: AtomicU64,
    pub history_degraded: AtomicU64,
}

impl BuildCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_build(&self, stats: &BuildStats) {
        self.trees_built.fetch_add(1, Ordering::Relaxed);
        self.rows_accepted
            .fetch_add(stats.rows_accepted, Ordering::Relaxed);
        self.rows_rejected
            .fetch_add(stats.rows_rejected, Ordering::Relaxed);
        self.history_degraded
            .fetch_add(stats.history_degraded, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> BuildTotals {
        BuildTotals {
            trees_built: self.trees_built.load(Ordering::Relaxed),
            rows_accepted: self.rows_accepted.load(Ordering::Relaxed),
            rows_rejected: self.rows_rejected.load(Ordering::Relaxed),
            history_degraded: self.history_degraded.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let totals = self.get_stats();
        info!(
            "Report build totals: trees={}, accepted={}, rejected={}, degraded_history={}",
            totals.trees_built, totals.rows_accepted, totals.rows_rejected, totals.history_degraded
        );
    }
}

/// Per-build row accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub rows_accepted: u64,
    pub rows_rejected: u64,
    pub history_degraded: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTotals {
    pub trees_built: u64,
    pub rows_accepted: u64,
    pub rows_rejected: u64,
    pub history_degraded: u64,
}

static REPORT_METRICS: std::sync::LazyLock<BuildCounters> =
    std::sync::LazyLock::new(BuildCounters::new);

pub fn report_metrics() -> &'static BuildCounters {
    &REPORT_METRICS
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate_builds() {
        let counters = BuildCounters::new();
        counters.record_build(&BuildStats {
            rows_accepted: 5,
            rows_rejected: 1,
            history_degraded: 0,
        });
        counters.record_build(&BuildStats {
            rows_accepted: 2,
            rows_rejected: 0,
            history_degraded: 3,
        });

        let totals = counters.get_stats();
        assert_eq!(totals.trees_built, 2);
        assert_eq!(totals.rows_accepted, 7);
        assert_eq!(totals.rows_rejected, 1);
        assert_eq!(totals.history_degraded, 3);
    }
}
