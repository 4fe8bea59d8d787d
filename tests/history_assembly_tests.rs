// Integration tests for history assembly against misbehaving history sources

mod fixtures;

use async_trait::async_trait;
use fixtures::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use testboard::results::{
    HistoryPoint, HistorySource, InMemoryHistory, RawMetric, ReportBuilder, ReportError,
    Timestamp,
};

/// Always fails, counting how often it was asked
#[derive(Default)]
struct UnreachableStore {
    calls: AtomicUsize,
}

#[async_trait]
impl HistorySource for UnreachableStore {
    async fn fetch_history(
        &self,
        case_id: u64,
        _time: Timestamp,
        _exclude_test_run_id: u64,
    ) -> Result<Vec<HistoryPoint>, ReportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ReportError::HistoryUnavailable {
            case_id,
            reason: "database is locked".to_string(),
        })
    }
}

/// Ignores the requested window and returns everything it has, newest first
struct UnfilteredStore {
    points: Vec<HistoryPoint>,
}

#[async_trait]
impl HistorySource for UnfilteredStore {
    async fn fetch_history(
        &self,
        _case_id: u64,
        _time: Timestamp,
        _exclude_test_run_id: u64,
    ) -> Result<Vec<HistoryPoint>, ReportError> {
        let mut points = self.points.clone();
        points.sort_by_key(|p| std::cmp::Reverse(p.time));
        Ok(points)
    }
}

fn point(time: &str, run: u64) -> HistoryPoint {
    HistoryPoint {
        time: ts(time),
        server_id: 1,
        server_name: "linux".to_string(),
        min_fps: None,
        avg_fps: Some(RawMetric::Number(run as f64 * 10.0)),
        mean_fps: None,
        max_fps: None,
        test_run_id: run,
    }
}

#[tokio::test]
async fn test_unreachable_history_still_builds_the_report() {
    let store = UnreachableStore::default();
    let rows = vec![
        performance("perf/a.test", 1).avg_fps(30.0).build(),
        console("perf/b.test", 2, "Y").build(),
        performance("perf/c.test", 3).avg_fps(31.0).build(),
    ];

    let outcome = ReportBuilder::new(&store).build(&rows).await;

    assert!(outcome.rejected.is_empty());
    assert_eq!(outcome.stats.rows_accepted, 3);
    assert_eq!(outcome.stats.history_degraded, 2);
    // only performance records ask for history
    assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    for record in outcome.tree.testcases() {
        if let Some(perf) = record.performance() {
            assert!(perf.history.is_empty());
        }
    }
}

#[tokio::test]
async fn test_unfiltered_source_is_trimmed_and_ordered() {
    let store = UnfilteredStore {
        points: vec![
            point("2016-03-01 12:00:00", 1),
            point("2016-03-05 12:00:00", 5),
            point("2016-03-03 12:00:00", 3),
            point("2016-03-04 12:00:00", 4),
            point("2016-03-02 12:00:00", 2),
        ],
    };
    let rows = vec![performance("perf/a.test", 1)
        .run(4)
        .at("2016-03-04 12:00:00")
        .avg_fps(40.0)
        .build()];

    let outcome = ReportBuilder::new(&store).build(&rows).await;
    assert_eq!(outcome.stats.history_degraded, 0);

    let record = outcome.tree.find_testcase("case1", None).unwrap();
    let runs: Vec<u64> = record
        .performance()
        .unwrap()
        .history
        .iter()
        .map(|p| p.test_run_id)
        .collect();
    assert_eq!(runs, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_parallel_servers_in_one_run_are_not_history() {
    let rows = vec![
        performance("perf/a.test", 1)
            .run(1)
            .at("2016-03-01 12:00:00")
            .avg_fps(20.0)
            .build(),
        performance("perf/a.test", 1)
            .run(2)
            .at("2016-03-02 12:00:00")
            .server(1, "linux")
            .avg_fps(21.0)
            .build(),
        performance("perf/a.test", 1)
            .run(2)
            .at("2016-03-02 12:00:00")
            .server(2, "win")
            .avg_fps(19.0)
            .build(),
    ];
    let history = InMemoryHistory::from_rows(&rows);
    let current: Vec<_> = rows.iter().filter(|r| r.test_run_id == 2).cloned().collect();

    let outcome = ReportBuilder::new(&history).build(&current).await;
    for record in outcome.tree.testcases() {
        let runs: Vec<u64> = record
            .performance()
            .unwrap()
            .history
            .iter()
            .map(|p| p.test_run_id)
            .collect();
        assert_eq!(runs, vec![1]);
    }
}
