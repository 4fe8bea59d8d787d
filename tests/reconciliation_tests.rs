// Integration tests for chart reconciliation over built report trees

mod fixtures;

use fixtures::*;
use testboard::chart::{ChartSelection, PointValue, TimeSeriesReconciler};
use testboard::results::{DisplayOptions, InMemoryHistory, ReportBuilder, ResultRow};

async fn current_run_tree(all_rows: &[ResultRow], run: u64) -> testboard::results::ReportOutcome {
    let history = InMemoryHistory::from_rows(all_rows);
    let rows: Vec<ResultRow> = all_rows
        .iter()
        .filter(|r| r.test_run_id == run)
        .cloned()
        .collect();
    ReportBuilder::new(&history).build(&rows).await
}

#[tokio::test]
async fn test_box_history_charts_on_one_axis() {
    let outcome = current_run_tree(&box_history(), 3).await;
    let record = outcome.tree.find_testcase("Box", None).unwrap();

    let selection = ChartSelection::new(["avg_fps"], ["linux", "win"]);
    let batch = TimeSeriesReconciler::default().reconcile(record, &selection);

    assert_eq!(batch.datasets.len(), 2);
    let expected = vec![
        ts("2016-03-01 12:00:00"),
        ts("2016-03-02 12:00:00"),
        ts("2016-03-03 12:00:00"),
    ];
    assert_eq!(batch.labels(), expected);

    let linux = &batch.datasets[0];
    let values: Vec<&PointValue> = linux.points.iter().map(|p| &p.value).collect();
    assert_eq!(
        values,
        vec![
            &PointValue::Number(50.0),
            &PointValue::Gap,
            &PointValue::Number(55.0)
        ]
    );

    let win = &batch.datasets[1];
    assert_eq!(win.timestamps(), expected);
    assert_eq!(win.points[1].value, PointValue::Number(40.0));
    assert!(win.points[0].value.is_gap() && win.points[2].value.is_gap());

    assert_eq!(batch.suggested_max, 60.0);
}

#[tokio::test]
async fn test_default_selection_comes_from_display_options() {
    let outcome = current_run_tree(&box_history(), 3).await;
    let options = DisplayOptions::from_tree(&outcome.tree);
    let selection = options.selection();

    assert_eq!(selection.properties, vec!["avg_fps"]);
    assert_eq!(selection.servers, vec!["linux"]);

    let record = outcome.tree.find_testcase("Box", Some("step1")).unwrap();
    let batch = TimeSeriesReconciler::default().reconcile(record, &selection);
    assert_eq!(batch.datasets.len(), 1);
    assert_eq!(
        batch.datasets[0].timestamps(),
        vec![ts("2016-03-01 12:00:00"), ts("2016-03-03 12:00:00")]
    );
}

#[tokio::test]
async fn test_ceiling_follows_the_fastest_sample() {
    let mut rows = box_history();
    rows.push(
        performance("nodes/geometry/Box.x3d", 1)
            .named("Box")
            .run(4)
            .at("2016-03-04 12:00:00")
            .avg_fps(30.0)
            .max_fps(144.0)
            .build(),
    );
    let outcome = current_run_tree(&rows, 4).await;
    let record = outcome.tree.find_testcase("Box", None).unwrap();

    let selection = ChartSelection::new(["avg_fps", "max_fps"], ["linux"]);
    let batch = TimeSeriesReconciler::new(60.0).reconcile(record, &selection);
    assert_eq!(batch.suggested_max, 144.0);

    // max_fps only has the newest sample; it is padded to the avg_fps axis
    let max = batch
        .datasets
        .iter()
        .find(|d| d.label == "max_fps")
        .unwrap();
    assert_eq!(max.points.len(), 3);
    assert_eq!(max.points.iter().filter(|p| p.value.is_gap()).count(), 2);
}

#[tokio::test]
async fn test_textual_metrics_in_history_are_parsed_or_dropped() {
    let rows = vec![
        performance("perf/Cone.x3d", 9)
            .named("Cone")
            .run(1)
            .at("2016-03-01 08:00:00")
            .avg_fps_text("47.25")
            .build(),
        performance("perf/Cone.x3d", 9)
            .named("Cone")
            .run(2)
            .at("2016-03-02 08:00:00")
            .avg_fps_text("crashed")
            .build(),
        performance("perf/Cone.x3d", 9)
            .named("Cone")
            .run(3)
            .at("2016-03-03 08:00:00")
            .avg_fps(48.0)
            .build(),
    ];
    let outcome = current_run_tree(&rows, 3).await;
    let record = outcome.tree.find_testcase("Cone", None).unwrap();

    let batch = TimeSeriesReconciler::default()
        .reconcile(record, &ChartSelection::new(["avg_fps"], ["linux"]));
    let values: Vec<Option<f64>> = batch.datasets[0]
        .points
        .iter()
        .map(|p| p.value.as_f64())
        .collect();
    assert_eq!(values, vec![Some(47.25), Some(48.0)]);
}

#[tokio::test]
async fn test_chart_batch_json_shape() {
    let outcome = current_run_tree(&box_history(), 3).await;
    let record = outcome.tree.find_testcase("Box", None).unwrap();
    let batch = TimeSeriesReconciler::default()
        .reconcile(record, &ChartSelection::new(["avg_fps", "server_name"], ["win"]));

    let json = serde_json::to_value(&batch).unwrap();
    assert_eq!(json["suggested_max"], 60.0);
    let datasets = json["datasets"].as_array().unwrap();
    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0]["label"], "avg_fps");
    assert_eq!(datasets[0]["points"][0]["x"], "2016-03-02 12:00:00");
    assert_eq!(datasets[0]["points"][0]["y"], 40.0);
    assert_eq!(datasets[1]["label"], "server_name");
    assert_eq!(datasets[1]["points"][0]["y"], "win");
}
