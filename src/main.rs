use anyhow::Result;
use clap::Parser;
use testboard::cli::commands::chart::ChartCommand;
use testboard::cli::commands::options::OptionsCommand;
use testboard::cli::commands::report::ReportCommand;
use testboard::cli::commands::Command;
use testboard::cli::{Cli, Commands};
use testboard::config::{config, init_config};
use testboard::observability::report_metrics;
use testboard::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config()?;
    init_telemetry(&settings.observability)?;
    init_config()?;
    let report = settings.report.clone();

    let result = tokio::runtime::Runtime::new()?.block_on(async {
        match cli.command {
            Commands::Report {
                source,
                output,
                summary,
            } => {
                ReportCommand::new(source, report)
                    .with_output(output)
                    .with_summary(summary)
                    .execute()
                    .await
            }
            Commands::Chart {
                source,
                case_name,
                step_name,
                properties,
                servers,
            } => {
                ChartCommand {
                    source,
                    case_name,
                    step_name,
                    properties,
                    servers,
                    config: report,
                }
                .execute()
                .await
            }
            Commands::Options { source } => OptionsCommand::new(source, report).execute().await,
        }
    });

    report_metrics().log_stats();
    result
}
