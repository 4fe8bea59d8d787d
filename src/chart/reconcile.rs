//! Alignment of independently sampled series onto one shared time axis.
//!
//! Every `(property, server)` pair of a selection yields at most one dataset. Each new
//! dataset is merged pairwise against every dataset accepted before it, so after the
//! last merge all datasets of a batch carry the same timestamps. A timestamp missing
//! from a series is filled with a gap, or with the fixed text of a descriptive series.

use super::series::*;
use crate::results::timestamp::Timestamp;
use crate::results::types::{FpsMetric, TestCaseRecord, DESCRIPTIVE_PROPERTIES};
use crate::telemetry::create_chart_span;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesReconciler {
    min_ceiling: f64,
}

impl Default for TimeSeriesReconciler {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_CEILING)
    }
}

impl TimeSeriesReconciler {
    pub fn new(min_ceiling: f64) -> Self {
        Self { min_ceiling }
    }

    /// Build the aligned datasets of `record` for every selected pair that has samples.
    pub fn reconcile(&self, record: &TestCaseRecord, selection: &ChartSelection) -> ChartBatch {
        let span = create_chart_span(&record.identity.name, selection.pair_count());
        let _guard = span.enter();

        let mut datasets: Vec<Dataset> = selection
            .pairs()
            .filter_map(|(property, server)| candidate_series(record, property, server))
            .collect();
        let inserted = align_datasets(&mut datasets);

        let suggested_max = datasets
            .iter()
            .filter_map(Dataset::max_value)
            .fold(self.min_ceiling, f64::max);

        debug!(
            datasets = datasets.len(),
            placeholders = inserted,
            suggested_max,
            "Chart series reconciled"
        );

        ChartBatch {
            datasets,
            suggested_max,
        }
    }
}

/// Candidate series for one pair, oldest point first, or `None` when it has no samples.
///
/// Metric values that do not parse as numbers are left out rather than charted.
pub fn candidate_series(record: &TestCaseRecord, property: &str, server: &str) -> Option<Dataset> {
    let own_server = record.identity.server_name == server;
    let history = record
        .performance()
        .map(|perf| perf.history.as_slice())
        .unwrap_or_default();

    let mut points: Vec<ChartPoint> = if let Some(metric) = FpsMetric::from_name(property) {
        let own = record
            .performance()
            .and_then(|perf| perf.fps(metric))
            .and_then(|raw| raw.as_f64())
            .filter(|_| own_server)
            .map(|value| ChartPoint::new(record.identity.time, PointValue::Number(value)));

        history
            .iter()
            .filter(|point| point.server_name == server)
            .filter_map(|point| {
                let value = point.fps(metric)?.as_f64()?;
                Some(ChartPoint::new(point.time, PointValue::Number(value)))
            })
            .chain(own)
            .collect()
    } else if DESCRIPTIVE_PROPERTIES.contains(&property) {
        let text = if property == "server_name" {
            server.to_string()
        } else {
            record.descriptive(property)?
        };
        history
            .iter()
            .filter(|point| point.server_name == server)
            .map(|point| point.time)
            .chain(own_server.then_some(record.identity.time))
            .map(|time| ChartPoint::new(time, PointValue::Text(text.clone())))
            .collect()
    } else {
        return None;
    };

    if points.is_empty() {
        return None;
    }
    points.sort_by_key(|point| point.time);

    Some(Dataset {
        label: property.to_string(),
        server_name: server.to_string(),
        points,
    })
}

/// Merge each dataset against every dataset before it, in order.
///
/// Returns the number of placeholder points inserted. Running it on an aligned batch
/// inserts nothing.
pub fn align_datasets(datasets: &mut [Dataset]) -> usize {
    let mut inserted = 0;
    for newest in 1..datasets.len() {
        let (accepted, rest) = datasets.split_at_mut(newest);
        let incoming = &mut rest[0];
        for existing in accepted.iter_mut() {
            inserted += merge_pair(existing, incoming);
        }
    }
    inserted
}

/// Two-cursor walk over both timestamp lists; a timestamp present on one side only
/// gets a placeholder on the other side at the same position.
pub fn merge_pair(a: &mut Dataset, b: &mut Dataset) -> usize {
    let fill_a = placeholder_for(a);
    let fill_b = placeholder_for(b);
    let mut inserted = 0;
    let (mut i, mut j) = (0, 0);

    loop {
        let time_a = a.points.get(i).map(|p| p.time);
        let time_b = b.points.get(j).map(|p| p.time);
        match (time_a, time_b) {
            (None, None) => break,
            (Some(ta), Some(tb)) if ta == tb => {}
            (Some(ta), None) => {
                insert_at(b, j, ta, &fill_b);
                inserted += 1;
            }
            (Some(ta), Some(tb)) if ta < tb => {
                insert_at(b, j, ta, &fill_b);
                inserted += 1;
            }
            (None, Some(tb)) | (Some(_), Some(tb)) => {
                insert_at(a, i, tb, &fill_a);
                inserted += 1;
            }
        }
        i += 1;
        j += 1;
    }

    inserted
}

fn insert_at(dataset: &mut Dataset, index: usize, time: Timestamp, fill: &PointValue) {
    dataset
        .points
        .insert(index, ChartPoint::new(time, fill.clone()));
}

/// Descriptive series repeat their one value; metric series get a gap.
fn placeholder_for(dataset: &Dataset) -> PointValue {
    if !DESCRIPTIVE_PROPERTIES.contains(&dataset.label.as_str()) {
        return PointValue::Gap;
    }
    dataset
        .points
        .iter()
        .find(|p| matches!(p.value, PointValue::Text(_)))
        .map(|p| p.value.clone())
        .unwrap_or(PointValue::Gap)
}
