use super::{build_tree, load_run, Command};
use crate::cli::SourceArgs;
use crate::config::ReportConfig;
use crate::results::{format_summary_report, TreeSummary};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub struct ReportCommand {
    pub source: SourceArgs,
    pub output: Option<PathBuf>,
    pub summary: bool,
    pub config: ReportConfig,
}

impl ReportCommand {
    pub fn new(source: SourceArgs, config: ReportConfig) -> Self {
        Self {
            source,
            output: None,
            summary: false,
            config,
        }
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }
}

impl Command for ReportCommand {
    async fn execute(&self) -> Result<()> {
        let run = load_run(&self.source).await?;
        let outcome = build_tree(&run, &self.config).await;

        let rendered = if self.summary {
            let summary = TreeSummary::from_tree(&outcome.tree);
            format_summary_report(&summary, run.test_run_id)
        } else {
            serde_json::to_string_pretty(&outcome.tree)?
        };

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, rendered)
                    .await
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                info!(path = %path.display(), "Report written");
                eprintln!("✅ Report written to {}", path.display());
            }
            None => println!("{rendered}"),
        }

        Ok(())
    }
}
