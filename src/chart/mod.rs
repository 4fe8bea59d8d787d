//! Chartable datasets derived from a test case record and its history.

pub mod reconcile;
pub mod series;

pub use reconcile::{align_datasets, candidate_series, merge_pair, TimeSeriesReconciler};
pub use series::{
    ChartBatch, ChartPoint, ChartSelection, Dataset, PointValue, DEFAULT_CHART_CEILING,
};
