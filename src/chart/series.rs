use crate::results::timestamp::{self, Timestamp};
use serde::{Deserialize, Serialize};

/// Floor for the suggested y-axis maximum, the frame-rate axis default
pub const DEFAULT_CHART_CEILING: f64 = 60.0;

/// Which `(property, server)` pairs the caller wants charted.
///
/// Both lists are kept in the order given with duplicates removed; datasets come
/// out properties-major in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSelection {
    pub properties: Vec<String>,
    pub servers: Vec<String>,
}

impl ChartSelection {
    pub fn new<P, S>(properties: P, servers: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            properties: dedup(properties),
            servers: dedup(servers),
        }
    }

    /// Number of candidate series this selection can produce
    pub fn pair_count(&self) -> usize {
        self.properties.len() * self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pair_count() == 0
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().flat_map(move |property| {
            self.servers
                .iter()
                .map(move |server| (property.as_str(), server.as_str()))
        })
    }
}

fn dedup<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.into();
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Value of one chart point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    Number(f64),
    /// Fixed text of a descriptive series such as `server_name`
    Text(String),
    /// No sample at this timestamp; rendered as a break in the line
    Gap,
}

impl PointValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PointValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, PointValue::Gap)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    #[serde(rename = "x", with = "timestamp")]
    pub time: Timestamp,
    #[serde(rename = "y")]
    pub value: PointValue,
}

impl ChartPoint {
    pub fn new(time: Timestamp, value: PointValue) -> Self {
        Self { time, value }
    }
}

/// One named series of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Property name, e.g. `avg_fps`
    pub label: String,
    pub server_name: String,
    pub points: Vec<ChartPoint>,
}

impl Dataset {
    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.points.iter().map(|p| p.time).collect()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.points
            .iter()
            .filter_map(|p| p.value.as_f64())
            .reduce(f64::max)
    }
}

/// Datasets sharing one time axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBatch {
    pub datasets: Vec<Dataset>,
    pub suggested_max: f64,
}

impl ChartBatch {
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Shared x-axis labels, taken from the first dataset
    pub fn labels(&self) -> Vec<Timestamp> {
        self.datasets
            .first()
            .map(Dataset::timestamps)
            .unwrap_or_default()
    }
}
