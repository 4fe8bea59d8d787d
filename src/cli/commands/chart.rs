use super::{build_tree, load_run, Command};
use crate::chart::{ChartSelection, TimeSeriesReconciler};
use crate::cli::SourceArgs;
use crate::config::ReportConfig;
use crate::results::DisplayOptions;
use anyhow::{anyhow, bail, Result};
use tracing::info;

pub struct ChartCommand {
    pub source: SourceArgs,
    pub case_name: String,
    pub step_name: Option<String>,
    pub properties: Vec<String>,
    pub servers: Vec<String>,
    pub config: ReportConfig,
}

impl ChartCommand {
    /// Selection to chart; empty lists fall back to the report's display defaults
    pub fn resolve_selection(&self, defaults: &DisplayOptions) -> Result<ChartSelection> {
        let fallback = defaults.selection();
        let properties = if self.properties.is_empty() {
            fallback.properties
        } else {
            self.properties.clone()
        };
        let servers = if self.servers.is_empty() {
            fallback.servers
        } else {
            self.servers.clone()
        };

        let selection = ChartSelection::new(properties, servers);
        if selection.pair_count() > self.config.max_series {
            bail!(
                "Selection of {} series exceeds the limit of {} (report.max_series)",
                selection.pair_count(),
                self.config.max_series
            );
        }
        Ok(selection)
    }
}

impl Command for ChartCommand {
    async fn execute(&self) -> Result<()> {
        let run = load_run(&self.source).await?;
        let outcome = build_tree(&run, &self.config).await;

        let step = self.step_name.as_deref();
        let record = match outcome.tree.find_performance_case(&self.case_name, step) {
            Some(record) => record,
            None if outcome.tree.find_testcase(&self.case_name, step).is_some() => bail!(
                "Test case '{}' has no performance measurement to chart",
                self.case_name
            ),
            None => {
                return Err(match step {
                    Some(step) => {
                        anyhow!("No test case '{}' with step '{}'", self.case_name, step)
                    }
                    None => anyhow!("No test case '{}'", self.case_name),
                })
            }
        };

        let defaults =
            DisplayOptions::with_default_properties(&outcome.tree, &self.config.default_properties);
        let selection = self.resolve_selection(&defaults)?;

        let batch = TimeSeriesReconciler::new(self.config.min_chart_ceiling)
            .reconcile(record, &selection);
        info!(
            case.name = %self.case_name,
            datasets = batch.datasets.len(),
            "Chart built"
        );

        println!("{}", serde_json::to_string_pretty(&batch)?);
        Ok(())
    }
}
