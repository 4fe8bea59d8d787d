use super::{build_tree, load_run, Command};
use crate::cli::SourceArgs;
use crate::config::ReportConfig;
use crate::results::DisplayOptions;
use anyhow::Result;

pub struct OptionsCommand {
    pub source: SourceArgs,
    pub config: ReportConfig,
}

impl OptionsCommand {
    pub fn new(source: SourceArgs, config: ReportConfig) -> Self {
        Self { source, config }
    }
}

impl Command for OptionsCommand {
    async fn execute(&self) -> Result<()> {
        let run = load_run(&self.source).await?;
        let outcome = build_tree(&run, &self.config).await;
        let options =
            DisplayOptions::with_default_properties(&outcome.tree, &self.config.default_properties);
        println!("{}", serde_json::to_string_pretty(&options)?);
        Ok(())
    }
}
