use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "testboard")]
#[command(about = "Test-run reporting: result trees and aligned performance charts")]
#[command(long_about = "Testboard folds the flat result rows of a test run into a \
                       category/file tree with pass/fail status, and reconciles performance \
                       history into chart series that share one time axis. Start with \
                       'testboard report --input rows.json'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the result tree of one test run
    Report {
        #[command(flatten)]
        source: SourceArgs,
        /// Write the tree to a file instead of stdout
        #[arg(long, short = 'o', help = "Write the JSON tree to this file")]
        output: Option<PathBuf>,
        /// Print a text summary instead of the JSON tree
        #[arg(long, help = "Print a human-readable summary instead of JSON")]
        summary: bool,
    },
    /// Reconcile the performance history of one test case into chart datasets
    Chart {
        #[command(flatten)]
        source: SourceArgs,
        /// Test case name
        #[arg(long = "case", help = "Name of the test case to chart")]
        case_name: String,
        /// Step name, when the case has several steps
        #[arg(long = "step", help = "Step name to pick among the case's steps")]
        step_name: Option<String>,
        /// Property to chart (repeatable)
        #[arg(long = "property", help = "Property to chart, e.g. avg_fps (repeatable)")]
        properties: Vec<String>,
        /// Server to chart (repeatable)
        #[arg(long = "server", help = "Server whose measurements to chart (repeatable)")]
        servers: Vec<String>,
    },
    /// List the chartable properties and servers of one test run
    Options {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Where result rows come from
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// JSON file holding an array of result rows
    #[arg(long, short = 'i', help = "JSON file with result rows of one or more test runs")]
    pub input: Option<PathBuf>,
    /// Test run to report on
    #[arg(long, help = "Test run id (default: the newest run in the source)")]
    pub run: Option<u64>,
    /// SQLite result store
    #[cfg(feature = "database")]
    #[arg(long, help = "SQLite result store URL, used instead of --input")]
    pub database: Option<String>,
}
