//! Row builders shared by the integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use testboard::results::{timestamp, RawMetric, ResultRow};

pub struct RowBuilder {
    row: ResultRow,
}

impl RowBuilder {
    pub fn new(path: &str, case_id: u64, result_type: &str) -> Self {
        Self {
            row: ResultRow {
                id: None,
                test_run_id: 1,
                timestamp: ts("2016-03-01 12:00:00"),
                server_id: 1,
                server_name: "linux".to_string(),
                file_id: None,
                filename: path.to_string(),
                case_id,
                case_name: format!("case{case_id}"),
                step_id: 1,
                step_name: "step1".to_string(),
                result_type: result_type.to_string(),
                success: None,
                output_image: None,
                diff_image: None,
                baseline_image: None,
                min_fps: None,
                max_fps: None,
                mean_fps: None,
                avg_fps: None,
                stdout: None,
                stderr: None,
                text_output: None,
                text_baseline: None,
                text_diff: None,
            },
        }
    }

    pub fn run(mut self, test_run_id: u64) -> Self {
        self.row.test_run_id = test_run_id;
        self
    }

    pub fn at(mut self, time: &str) -> Self {
        self.row.timestamp = ts(time);
        self
    }

    pub fn server(mut self, server_id: u64, name: &str) -> Self {
        self.row.server_id = server_id;
        self.row.server_name = name.to_string();
        self
    }

    pub fn named(mut self, case_name: &str) -> Self {
        self.row.case_name = case_name.to_string();
        self
    }

    pub fn step(mut self, step_id: u64, step_name: &str) -> Self {
        self.row.step_id = step_id;
        self.row.step_name = step_name.to_string();
        self
    }

    pub fn success(mut self, flag: &str) -> Self {
        self.row.success = Some(flag.to_string());
        self
    }

    pub fn avg_fps(mut self, value: f64) -> Self {
        self.row.avg_fps = Some(RawMetric::Number(value));
        self
    }

    pub fn avg_fps_text(mut self, value: &str) -> Self {
        self.row.avg_fps = Some(RawMetric::Text(value.to_string()));
        self
    }

    pub fn max_fps(mut self, value: f64) -> Self {
        self.row.max_fps = Some(RawMetric::Number(value));
        self
    }

    pub fn build(self) -> ResultRow {
        self.row
    }
}

pub fn ts(raw: &str) -> timestamp::Timestamp {
    timestamp::parse(raw).expect("fixture timestamp")
}

pub fn performance(path: &str, case_id: u64) -> RowBuilder {
    RowBuilder::new(path, case_id, "performance")
}

pub fn error(path: &str, case_id: u64) -> RowBuilder {
    RowBuilder::new(path, case_id, "error")
}

pub fn console(path: &str, case_id: u64, flag: &str) -> RowBuilder {
    RowBuilder::new(path, case_id, "console").success(flag)
}

/// Performance rows of one case across several runs, one run per day
pub fn box_history() -> Vec<ResultRow> {
    vec![
        performance("nodes/geometry/Box.x3d", 1)
            .named("Box")
            .run(1)
            .at("2016-03-01 12:00:00")
            .server(1, "linux")
            .avg_fps(50.0)
            .build(),
        performance("nodes/geometry/Box.x3d", 1)
            .named("Box")
            .run(2)
            .at("2016-03-02 12:00:00")
            .server(2, "win")
            .avg_fps(40.0)
            .build(),
        performance("nodes/geometry/Box.x3d", 1)
            .named("Box")
            .run(3)
            .at("2016-03-03 12:00:00")
            .server(1, "linux")
            .avg_fps(55.0)
            .build(),
    ]
}

pub fn write_rows(dir: &Path, rows: &[ResultRow]) -> PathBuf {
    let path = dir.join("rows.json");
    std::fs::write(&path, serde_json::to_string_pretty(rows).expect("serialize rows"))
        .expect("write rows");
    path
}
