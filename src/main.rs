//! gui-tester - concurrency-bounded batch runner for GUI tests
//!
//! Discovers `.goml` test specifications, runs each one through the
//! `browser-ui-test` engine with a bounded number of concurrent jobs, and
//! reports successful, failed and errored tests in a stable order.
//!
//! ## Features
//!
//! - Bounded concurrency (`--jobs`), strictly sequential with `--no-headless`
//! - Compact progress bar while tests complete
//! - Deterministic report regardless of completion order
//! - Multiple output formats (Table, JSON, Summary) and JSON/CSV export
//!
//! ## Usage
//!
//! ```bash
//! # Run every test in gui-tests/ with 4 jobs
//! gui-tester run --jobs 4
//!
//! # Run selected files
//! gui-tester run --file search.goml --file source.goml
//!
//! # Watch a test in a real browser
//! gui-tester run --file search.goml --no-headless
//!
//! # Show the latest saved run
//! gui-tester results latest
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::error::ErrorKind;
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

mod cli;
mod config;
mod discovery;
mod executor;
mod models;
mod output;
mod progress;
mod results;
mod utils;

use cli::Args;
use config::{EnvConfig, RunSettings, RunnerConfig};
use executor::{RunError, Scheduler};
use output::{OutputFormat, ReportFormatter};
use results::{EnvironmentInfo, ResultsStorage, StoredRun};
use utils::{init_logger, LogLevel};

/// Exit status when discovery selects nothing
const NO_TESTS_EXIT: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // help and version go to stdout, usage errors to stderr
            let _ = e.print();
            return ExitCode::from(exit_status_for(&e));
        }
    };

    let debug = matches!(&args.command, cli::Command::Run(run) if run.debug);
    init_logger(LogLevel::for_flags(args.verbose || debug));

    match dispatch(args).await {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<RunError>() {
            Some(RunError::NoTestsSelected) => {
                eprintln!("No test selected");
                ExitCode::from(NO_TESTS_EXIT)
            }
            _ => {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Exit status for a command line that could not be parsed.
///
/// Usage errors are fatal run errors (1); status 2 is reserved for an
/// empty test selection.
fn exit_status_for(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

async fn dispatch(args: Args) -> Result<ExitCode> {
    let env = EnvConfig::load();
    let config_path = args.config.as_deref();

    match args.command {
        cli::Command::Run(run_args) => {
            let file = RunnerConfig::load_layered(config_path, &env)?;
            let settings = RunSettings::resolve(&run_args, &env, &file)?;
            run_tests(settings).await
        }
        cli::Command::List(list_args) => {
            let file = RunnerConfig::load_layered(config_path, &env)?;
            list_tests(list_args, &env, &file)
        }
        cli::Command::Results(results_args) => {
            let file = RunnerConfig::load_layered(config_path, &env)?;
            show_results(results_args, &file)
        }
        cli::Command::Config(config_args) => manage_config(config_args, config_path, &env),
    }
}

async fn run_tests(settings: RunSettings) -> Result<ExitCode> {
    let items = discovery::discover(&settings.files, &settings.test_dir)?;
    if items.is_empty() {
        return Err(RunError::NoTestsSelected.into());
    }

    if !settings.headless {
        println!("`--no-headless` option is active, disabling concurrency for running tests.");
    }
    let total = items.len();
    let slots = settings.limit.resolve(total);
    println!("Running {total} GUI tests ({slots} concurrently) ...");

    let (events, receiver) = progress::event_channel();
    let printer = progress::spawn_status_printer(receiver, total);

    let started_at = Utc::now();
    let results = Scheduler::new(&settings.engine, settings.limit)
        .with_events(events)
        .run(items)
        .await?;

    printer
        .await
        .context("Status printer panicked")?
        .context("Failed to write progress")?;

    let mut formatter = ReportFormatter::new(settings.format).show_successful(settings.debug);
    if !std::io::stdout().is_terminal() {
        formatter = formatter.no_color();
    }
    let report = formatter.format(&results)?;
    print_report(&report, settings.format);

    if settings.output.is_some() || settings.save {
        let run = StoredRun::new(
            started_at,
            slots.to_string(),
            results.clone(),
            EnvironmentInfo::new(settings.engine.program()),
        );
        if let Some(path) = &settings.output {
            results::export(&run, path)?;
        }
        if settings.save {
            let storage = storage_for(settings.results_dir.as_deref());
            let path = storage.save(&run)?;
            println!("Saved run {} to {}", run.id, path.display());
        }
    }

    info!("Exiting with {} failed tests", results.failed.len() + results.errored.len());
    Ok(if results.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(report: &output::Report, format: OutputFormat) {
    match format {
        OutputFormat::Table => print!("{}", report.out),
        _ => println!("{}", report.out),
    }
    if !report.err.is_empty() {
        eprint!("{}", report.err);
    }
}

fn storage_for(results_dir: Option<&Path>) -> ResultsStorage {
    match results_dir {
        Some(dir) => ResultsStorage::new(dir),
        None => ResultsStorage::default_dir(),
    }
}

fn list_tests(args: cli::ListArgs, env: &EnvConfig, file: &RunnerConfig) -> Result<ExitCode> {
    let test_dir = args
        .dir
        .or_else(|| env.test_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| file.test_dir.clone());

    let items = discovery::discover(&args.files, &test_dir)?;
    if items.is_empty() {
        return Err(RunError::NoTestsSelected.into());
    }

    println!("\nSelected GUI tests ({} total)\n", items.len());
    for (i, item) in items.iter().enumerate() {
        println!("  {:3}. {}", i + 1, item);
    }
    println!();

    Ok(ExitCode::SUCCESS)
}

fn show_results(args: cli::ResultsArgs, file: &RunnerConfig) -> Result<ExitCode> {
    let storage = storage_for(file.results_dir.as_deref());

    let Some(id) = args.id else {
        let runs = storage.list_runs()?;
        if runs.is_empty() {
            println!("No saved runs in {}", storage.base_dir().display());
            return Ok(ExitCode::SUCCESS);
        }

        println!(
            "\n{:<22} {:<20} {:>6} {:>7} {:>8}",
            "ID", "STARTED", "TOTAL", "FAILED", "ERRORED"
        );
        println!("{:-<67}", "");
        for run in runs {
            println!(
                "{:<22} {:<20} {:>6} {:>7} {:>8}",
                run.id,
                run.started_at.format("%Y-%m-%d %H:%M:%S"),
                run.total,
                run.failed,
                run.errored
            );
        }
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    let run = if id == "latest" {
        storage
            .latest()?
            .with_context(|| format!("No saved runs in {}", storage.base_dir().display()))?
    } else {
        storage.load(&id)?
    };

    let format = args
        .format
        .parse::<OutputFormat>()
        .map_err(anyhow::Error::msg)?;
    println!(
        "Run {} ({}, {} jobs, engine {}, started {})",
        run.id,
        if run.passed() { "passed" } else { "failed" },
        run.jobs,
        run.environment.engine,
        run.started_at.format("%Y-%m-%d %H:%M:%S")
    );
    let report = ReportFormatter::new(format).no_color().format(&run.results)?;
    print_report(&report, format);

    if let Some(path) = &args.export {
        results::export(&run, path)?;
        println!("Exported run {} to {}", run.id, path.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn manage_config(
    args: cli::ConfigArgs,
    config_path: Option<&Path>,
    env: &EnvConfig,
) -> Result<ExitCode> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    output.display()
                );
            }

            RunnerConfig::default().save(&output)?;
            println!("✓ Configuration file created: {}", output.display());
        }

        cli::ConfigAction::Show { env: show_env, format } => {
            if show_env {
                env.print_summary();
                println!();
                config::print_env_help();
            } else {
                let config = RunnerConfig::load_layered(config_path, env)?;
                let output = if format == "json" {
                    serde_json::to_string_pretty(&config)?
                } else {
                    serde_yaml::to_string(&config)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Validate { file } => {
            let Some(path) = file.or_else(config::find_config_file) else {
                println!("No configuration file found. Searched:");
                for location in config::CONFIG_LOCATIONS {
                    println!("  {location}");
                }
                return Ok(ExitCode::SUCCESS);
            };

            match RunnerConfig::load(&path) {
                Ok(_) => println!("✓ Configuration file is valid: {}", path.display()),
                Err(e) => {
                    println!("✗ Configuration file is invalid: {}", path.display());
                    println!("  Error: {e:#}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_for(args: &[&str]) -> u8 {
        let err = Args::try_parse_from(args).unwrap_err();
        exit_status_for(&err)
    }

    #[test]
    fn test_invalid_jobs_is_a_failure_not_an_empty_selection() {
        assert_eq!(status_for(&["gui-tester", "run", "--jobs", "abc"]), 1);
        assert_eq!(status_for(&["gui-tester", "run", "--jobs", "-3"]), 1);
        assert_ne!(status_for(&["gui-tester", "run", "--jobs", "abc"]), NO_TESTS_EXIT);
    }

    #[test]
    fn test_unknown_arguments_fail() {
        assert_eq!(status_for(&["gui-tester", "run", "--bogus"]), 1);
        assert_eq!(status_for(&["gui-tester"]), 1);
    }

    #[test]
    fn test_help_and_version_succeed() {
        assert_eq!(status_for(&["gui-tester", "--help"]), 0);
        assert_eq!(status_for(&["gui-tester", "run", "--help"]), 0);
        assert_eq!(status_for(&["gui-tester", "--version"]), 0);
    }
}
