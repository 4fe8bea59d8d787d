use super::types::*;
use std::collections::BTreeMap;

/// Counts over one report tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub categories: usize,
    pub files: usize,
    pub failed_files: usize,
    pub records_by_type: BTreeMap<&'static str, usize>,
    pub servers: Vec<String>,
    pub failed_paths: Vec<String>,
}

impl TreeSummary {
    pub fn from_tree(tree: &ResultTree) -> Self {
        let mut summary = Self::default();
        let mut path = Vec::new();
        summary.visit(tree.roots(), &mut path);
        summary
    }

    fn visit<'a>(&mut self, nodes: &'a [TreeNode], path: &mut Vec<&'a str>) {
        for node in nodes {
            path.push(node.name());
            match node {
                TreeNode::Category(category) => {
                    self.categories += 1;
                    self.visit(&category.children, path);
                }
                TreeNode::File(file) => {
                    self.files += 1;
                    if !file.success {
                        self.failed_files += 1;
                        self.failed_paths.push(path.join("/"));
                    }
                    for record in &file.testcases {
                        let Some(result_type) = record.result_type() else {
                            continue;
                        };
                        *self.records_by_type.entry(result_type.as_str()).or_default() += 1;
                        if !self.servers.contains(&record.identity.server_name) {
                            self.servers.push(record.identity.server_name.clone());
                        }
                    }
                }
            }
            path.pop();
        }
    }

    pub fn total_records(&self) -> usize {
        self.records_by_type.values().sum()
    }

    pub fn passed(&self) -> bool {
        self.failed_files == 0
    }
}

pub fn format_summary_report(summary: &TreeSummary, test_run_id: Option<u64>) -> String {
    let mut report = String::new();

    match test_run_id {
        Some(run) => report.push_str(&format!("🧪 TEST RUN {run} REPORT\n")),
        None => report.push_str("🧪 TEST RUN REPORT\n"),
    }
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str("📊 OVERVIEW\n");
    report.push_str(&format!("   Categories:   {}\n", summary.categories));
    report.push_str(&format!(
        "   Test files:   {} ({} failed)\n",
        summary.files, summary.failed_files
    ));
    report.push_str(&format!("   Test steps:   {}\n", summary.total_records()));
    if !summary.servers.is_empty() {
        report.push_str(&format!("   Servers:      {}\n", summary.servers.join(", ")));
    }
    report.push('\n');

    if !summary.records_by_type.is_empty() {
        report.push_str("📋 STEPS BY RESULT TYPE\n");
        for (result_type, count) in &summary.records_by_type {
            report.push_str(&format!("   {result_type:<12} {count}\n"));
        }
        report.push('\n');
    }

    if summary.passed() {
        report.push_str("✅ All test files passed\n");
    } else {
        report.push_str("❌ FAILED TEST FILES\n");
        for path in &summary.failed_paths {
            report.push_str(&format!("   {path}\n"));
        }
    }

    report
}
