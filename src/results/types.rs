use super::blob;
use super::timestamp::{self, Timestamp};
use serde::{Deserialize, Serialize};

/// One flat row from the result store, as produced by the per-run union query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(default)]
    pub id: Option<u64>,
    pub test_run_id: u64,
    #[serde(with = "timestamp")]
    pub timestamp: Timestamp,
    pub server_id: u64,
    pub server_name: String,
    #[serde(default)]
    pub file_id: Option<u64>,
    /// Slash-delimited category path ending in the test file name
    pub filename: String,
    pub case_id: u64,
    pub case_name: String,
    pub step_id: u64,
    #[serde(default)]
    pub step_name: String,
    pub result_type: String,
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default, with = "blob")]
    pub output_image: Option<Vec<u8>>,
    #[serde(default, with = "blob")]
    pub diff_image: Option<Vec<u8>>,
    #[serde(default, with = "blob")]
    pub baseline_image: Option<Vec<u8>>,
    #[serde(default)]
    pub min_fps: Option<RawMetric>,
    #[serde(default)]
    pub max_fps: Option<RawMetric>,
    #[serde(default)]
    pub mean_fps: Option<RawMetric>,
    #[serde(default)]
    pub avg_fps: Option<RawMetric>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub text_output: Option<String>,
    #[serde(default)]
    pub text_baseline: Option<String>,
    #[serde(default)]
    pub text_diff: Option<String>,
}

/// A numeric column exactly as the store returned it.
///
/// Older runs wrote frame rates as formatted text ("59.94"), newer ones as real
/// numbers; both are kept verbatim and only interpreted when charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMetric {
    Number(f64),
    Text(String),
}

impl RawMetric {
    /// Numeric value, or `None` when the stored value is garbled or not finite
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawMetric::Number(v) => *v,
            RawMetric::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawMetric {
    fn from(value: f64) -> Self {
        RawMetric::Number(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Performance,
    Rendering,
    Console,
    Custom,
    Error,
}

impl ResultType {
    pub const ALL: [ResultType; 5] = [
        ResultType::Performance,
        ResultType::Rendering,
        ResultType::Console,
        ResultType::Custom,
        ResultType::Error,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Performance => "performance",
            ResultType::Rendering => "rendering",
            ResultType::Console => "console",
            ResultType::Custom => "custom",
            ResultType::Error => "error",
        }
    }
}

/// The four frame-rate columns recorded for performance steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FpsMetric {
    Min,
    Avg,
    Mean,
    Max,
}

impl FpsMetric {
    pub const ALL: [FpsMetric; 4] = [
        FpsMetric::Min,
        FpsMetric::Avg,
        FpsMetric::Mean,
        FpsMetric::Max,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FpsMetric::Min => "min_fps",
            FpsMetric::Avg => "avg_fps",
            FpsMetric::Mean => "mean_fps",
            FpsMetric::Max => "max_fps",
        }
    }
}

/// Fields every test case record carries regardless of its result type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseIdentity {
    pub name: String,
    pub step_name: String,
    pub filename: String,
    pub case_id: u64,
    pub step_id: u64,
    pub server_id: u64,
    pub server_name: String,
    #[serde(with = "timestamp")]
    pub time: Timestamp,
    pub test_run_id: u64,
}

/// One executed step, flattened on output to identity fields, a `result_type`
/// tag and the variant payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCaseRecord {
    #[serde(flatten)]
    pub identity: CaseIdentity,
    #[serde(flatten)]
    pub outcome: CaseOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result_type", rename_all = "lowercase")]
pub enum CaseOutcome {
    Performance(PerformanceOutcome),
    Rendering(RenderingOutcome),
    Console(TextOutcome),
    Custom(TextOutcome),
    Error(ErrorOutcome),
    /// Only used by the "no results" placeholder record
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceOutcome {
    pub min_fps: Option<RawMetric>,
    pub avg_fps: Option<RawMetric>,
    pub mean_fps: Option<RawMetric>,
    pub max_fps: Option<RawMetric>,
    pub history: Vec<HistoryPoint>,
}

impl PerformanceOutcome {
    pub fn fps(&self, metric: FpsMetric) -> Option<&RawMetric> {
        match metric {
            FpsMetric::Min => self.min_fps.as_ref(),
            FpsMetric::Avg => self.avg_fps.as_ref(),
            FpsMetric::Mean => self.mean_fps.as_ref(),
            FpsMetric::Max => self.max_fps.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderingOutcome {
    pub success: Option<String>,
    #[serde(serialize_with = "blob::serialize")]
    pub output_image: Option<Vec<u8>>,
    #[serde(serialize_with = "blob::serialize")]
    pub diff_image: Option<Vec<u8>>,
    #[serde(serialize_with = "blob::serialize")]
    pub baseline_image: Option<Vec<u8>>,
}

/// Payload shared by console and custom text comparisons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOutcome {
    pub success: Option<String>,
    pub text_output: Option<String>,
    pub text_baseline: Option<String>,
    pub text_diff: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorOutcome {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

/// Flag value the test runner writes for a failed comparison
pub const FAILED_FLAG: &str = "N";

impl TestCaseRecord {
    pub fn result_type(&self) -> Option<ResultType> {
        match self.outcome {
            CaseOutcome::Performance(_) => Some(ResultType::Performance),
            CaseOutcome::Rendering(_) => Some(ResultType::Rendering),
            CaseOutcome::Console(_) => Some(ResultType::Console),
            CaseOutcome::Custom(_) => Some(ResultType::Custom),
            CaseOutcome::Error(_) => Some(ResultType::Error),
            CaseOutcome::Ignore => None,
        }
    }

    /// Whether this record fails its containing file.
    ///
    /// Error records always fail; comparison records fail on an explicit "N".
    pub fn signals_failure(&self) -> bool {
        let flag = match &self.outcome {
            CaseOutcome::Error(_) => return true,
            CaseOutcome::Rendering(r) => r.success.as_deref(),
            CaseOutcome::Console(t) | CaseOutcome::Custom(t) => t.success.as_deref(),
            CaseOutcome::Performance(_) | CaseOutcome::Ignore => None,
        };
        flag == Some(FAILED_FLAG)
    }

    pub fn performance(&self) -> Option<&PerformanceOutcome> {
        match &self.outcome {
            CaseOutcome::Performance(p) => Some(p),
            _ => None,
        }
    }

    pub fn performance_mut(&mut self) -> Option<&mut PerformanceOutcome> {
        match &mut self.outcome {
            CaseOutcome::Performance(p) => Some(p),
            _ => None,
        }
    }

    /// Text value of a non-metric field, for descriptive chart series
    pub fn descriptive(&self, property: &str) -> Option<String> {
        let id = &self.identity;
        match property {
            "name" => Some(id.name.clone()),
            "step_name" => Some(id.step_name.clone()),
            "filename" => Some(id.filename.clone()),
            "server_name" => Some(id.server_name.clone()),
            "result_type" => self.result_type().map(|t| t.as_str().to_string()),
            _ => None,
        }
    }
}

/// Names accepted by [`TestCaseRecord::descriptive`]
pub const DESCRIPTIVE_PROPERTIES: [&str; 5] =
    ["name", "step_name", "filename", "server_name", "result_type"];

/// A prior performance measurement of the same test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    #[serde(with = "timestamp")]
    pub time: Timestamp,
    pub server_id: u64,
    pub server_name: String,
    pub min_fps: Option<RawMetric>,
    pub avg_fps: Option<RawMetric>,
    pub mean_fps: Option<RawMetric>,
    pub max_fps: Option<RawMetric>,
    pub test_run_id: u64,
}

impl HistoryPoint {
    pub fn fps(&self, metric: FpsMetric) -> Option<&RawMetric> {
        match metric {
            FpsMetric::Min => self.min_fps.as_ref(),
            FpsMetric::Avg => self.avg_fps.as_ref(),
            FpsMetric::Mean => self.mean_fps.as_ref(),
            FpsMetric::Max => self.max_fps.as_ref(),
        }
    }
}

/// A node of the report tree: either a category grouping or a test file leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TreeNode {
    Category(CategoryNode),
    File(FileNode),
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Category(c) => &c.name,
            TreeNode::File(f) => &f.name,
        }
    }

    pub fn success(&self) -> bool {
        match self {
            TreeNode::Category(c) => c.success,
            TreeNode::File(f) => f.success,
        }
    }

    pub fn as_category(&self) -> Option<&CategoryNode> {
        match self {
            TreeNode::Category(c) => Some(c),
            TreeNode::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            TreeNode::File(f) => Some(f),
            TreeNode::Category(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    pub name: String,
    pub children: Vec<TreeNode>,
    pub success: bool,
}

impl CategoryNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
            success: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileNode {
    pub name: String,
    pub testcases: Vec<TestCaseRecord>,
    pub success: bool,
}

impl FileNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            testcases: Vec::new(),
            success: true,
        }
    }
}

/// Root level of a report tree. Nodes are only added through
/// [`ResultTree::insert`](crate::results::ResultTree::insert).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultTree {
    pub(super) roots: Vec<TreeNode>,
}
