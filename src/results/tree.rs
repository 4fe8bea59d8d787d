//! Incremental construction of the category/file tree.
//!
//! Each row's `filename` is split on `/`; every segment but the last names a
//! category, the last names the test file whose `testcases` receive the record.
//! Siblings are unique by name and keep first-seen order. A failing record clears
//! `success` on its file and on every category above it, and nothing sets it back.

use super::classify::RowClassifier;
use super::errors::{PathConflict, ReportError};
use super::timestamp::Timestamp;
use super::types::*;

/// Name of the file node substituted when a run has no results
pub const NO_RESULTS_LABEL: &str = "No results found";

impl ResultTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder tree for an empty result set, so renderers always have a node.
    pub fn no_results(label: &str) -> Self {
        let placeholder = TestCaseRecord {
            identity: CaseIdentity {
                name: String::new(),
                step_name: String::new(),
                filename: "Error".to_string(),
                case_id: 0,
                step_id: 0,
                server_id: 0,
                server_name: String::new(),
                time: Timestamp::default(),
                test_run_id: 0,
            },
            outcome: CaseOutcome::Ignore,
        };
        let mut file = FileNode::new(label);
        file.testcases.push(placeholder);
        Self {
            roots: vec![TreeNode::File(file)],
        }
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Whether every file in the tree passed
    pub fn success(&self) -> bool {
        self.roots.iter().all(TreeNode::success)
    }

    /// Classify `row` and attach it to the file its path names.
    pub fn insert(&mut self, row: &ResultRow) -> Result<&FileNode, ReportError> {
        let record = RowClassifier::classify(row)?;
        self.insert_record(record)
    }

    /// Attach an already classified record, creating missing categories and the
    /// file leaf on the way. A rejected record leaves the tree untouched.
    pub fn insert_record(&mut self, record: TestCaseRecord) -> Result<&FileNode, ReportError> {
        let path = record.identity.filename.clone();
        let segments = split_path(&path)?;
        let Some((file_name, categories)) = segments.split_last() else {
            return Err(ReportError::malformed_path(&path, PathConflict::EmptySegment));
        };
        self.check_path(&path, categories, file_name)?;

        let failed = record.signals_failure();
        let mut level = &mut self.roots;
        for segment in categories {
            let index = find_or_push(level, segment, || {
                TreeNode::Category(CategoryNode::new(segment))
            });
            level = match &mut level[index] {
                TreeNode::Category(category) => {
                    if failed {
                        category.success = false;
                    }
                    &mut category.children
                }
                TreeNode::File(_) => {
                    return Err(ReportError::malformed_path(
                        &path,
                        PathConflict::FileWhereCategoryExpected {
                            segment: segment.to_string(),
                        },
                    ))
                }
            };
        }

        let index = find_or_push(level, file_name, || TreeNode::File(FileNode::new(file_name)));
        match &mut level[index] {
            TreeNode::File(file) => {
                if failed {
                    file.success = false;
                }
                file.testcases.push(record);
                Ok(&*file)
            }
            TreeNode::Category(_) => Err(ReportError::malformed_path(
                &path,
                PathConflict::CategoryWhereFileExpected {
                    segment: file_name.to_string(),
                },
            )),
        }
    }

    /// Read-only walk that reports a structural conflict before anything is created.
    fn check_path(
        &self,
        path: &str,
        categories: &[&str],
        file_name: &str,
    ) -> Result<(), ReportError> {
        let mut level = self.roots.as_slice();
        for segment in categories {
            match level.iter().find(|node| node.name() == *segment) {
                // everything below a new category is new as well
                None => return Ok(()),
                Some(TreeNode::Category(category)) => level = &category.children,
                Some(TreeNode::File(_)) => {
                    return Err(ReportError::malformed_path(
                        path,
                        PathConflict::FileWhereCategoryExpected {
                            segment: segment.to_string(),
                        },
                    ))
                }
            }
        }
        match level.iter().find(|node| node.name() == file_name) {
            Some(TreeNode::Category(_)) => Err(ReportError::malformed_path(
                path,
                PathConflict::CategoryWhereFileExpected {
                    segment: file_name.to_string(),
                },
            )),
            _ => Ok(()),
        }
    }

    /// All file leaves, depth-first in insertion order
    pub fn files(&self) -> Vec<&FileNode> {
        let mut files = Vec::new();
        collect_files(&self.roots, &mut files);
        files
    }

    pub fn testcases(&self) -> impl Iterator<Item = &TestCaseRecord> {
        self.files().into_iter().flat_map(|file| file.testcases.iter())
    }

    /// First record with the given case name (and step name, when given)
    pub fn find_testcase(&self, name: &str, step_name: Option<&str>) -> Option<&TestCaseRecord> {
        self.testcases().find(|record| {
            record.identity.name == name
                && step_name.map_or(true, |step| record.identity.step_name == step)
        })
    }

    /// Like [`ResultTree::find_testcase`], skipping every record that is not a
    /// performance measurement.
    pub fn find_performance_case(
        &self,
        name: &str,
        step_name: Option<&str>,
    ) -> Option<&TestCaseRecord> {
        self.testcases().find(|record| {
            record.performance().is_some()
                && record.identity.name == name
                && step_name.map_or(true, |step| record.identity.step_name == step)
        })
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, ReportError> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(ReportError::malformed_path(path, PathConflict::EmptySegment));
    }
    Ok(segments)
}

fn find_or_push(level: &mut Vec<TreeNode>, name: &str, make: impl FnOnce() -> TreeNode) -> usize {
    match level.iter().position(|node| node.name() == name) {
        Some(index) => index,
        None => {
            level.push(make());
            level.len() - 1
        }
    }
}

fn collect_files<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a FileNode>) {
    for node in nodes {
        match node {
            TreeNode::Category(category) => collect_files(&category.children, out),
            TreeNode::File(file) => out.push(file),
        }
    }
}
