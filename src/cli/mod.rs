//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Concurrency-bounded batch runner for GUI test specifications
#[derive(Parser, Debug)]
#[command(name = "gui-tester")]
#[command(version)]
#[command(about = "Run .goml GUI tests through browser-ui-test with a bounded job count")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to the first standard location found)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run GUI tests
    Run(RunArgs),

    /// List the tests a run would select
    List(ListArgs),

    /// View saved runs
    Results(ResultsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Test file to run (can be repeated)
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Directory scanned for .goml files when no --file is given
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Number of tests to run concurrently (0 runs all of them at once)
    #[arg(short, long, value_name = "NUMBER")]
    pub jobs: Option<usize>,

    /// Show extra information about the run, including successful output
    #[arg(long)]
    pub debug: bool,

    /// Render font in pages
    #[arg(long)]
    pub show_text: bool,

    /// Disable headless mode; forces one job at a time
    #[arg(long)]
    pub no_headless: bool,

    /// Test engine executable
    #[arg(long, value_name = "CMD")]
    pub engine: Option<String>,

    /// Output format (table, json, json-pretty, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Export results to a .json or .csv file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Store the run in the results directory
    #[arg(long)]
    pub save: bool,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Test file to select (can be repeated)
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Directory scanned for .goml files
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Arguments for results command
#[derive(Parser, Debug)]
pub struct ResultsArgs {
    /// Run ID to show, or "latest"; lists stored runs when omitted
    pub id: Option<String>,

    /// Output format for a shown run
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Export the shown run to a .json or .csv file
    #[arg(short, long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init {
        /// Output path
        #[arg(short, long, default_value = "gui-tester.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Show environment variables instead
        #[arg(long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the first standard location found)
        file: Option<PathBuf>,
    },
}
