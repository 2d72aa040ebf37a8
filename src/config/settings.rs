//! Effective settings for a run
//!
//! Layers CLI flags over environment variables over the config file.
//! Everything is validated here, before a single test is admitted.

use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{EnvConfig, RunnerConfig};
use crate::cli::RunArgs;
use crate::executor::CommandEngine;
use crate::models::ConcurrencyLimit;
use crate::output::OutputFormat;

/// Fully resolved run settings
#[derive(Clone, Debug)]
pub struct RunSettings {
    pub files: Vec<PathBuf>,
    pub test_dir: PathBuf,
    pub limit: ConcurrencyLimit,
    pub engine: CommandEngine,
    pub format: OutputFormat,
    pub debug: bool,
    pub headless: bool,
    pub output: Option<PathBuf>,
    pub save: bool,
    pub results_dir: Option<PathBuf>,
}

impl RunSettings {
    pub fn resolve(args: &RunArgs, env: &EnvConfig, file: &RunnerConfig) -> Result<Self> {
        let headless = !args.no_headless;

        let jobs = match (args.jobs, env.jobs.as_deref()) {
            (Some(jobs), _) => i64::try_from(jobs).context("`--jobs` value is too large")?,
            (None, Some(raw)) => raw.trim().parse::<i64>().with_context(|| {
                format!("GUI_TESTER_JOBS expects a number, found `{raw}`")
            })?,
            (None, None) => file.jobs,
        };
        let limit = if headless {
            ConcurrencyLimit::from_jobs(jobs)
        } else {
            ConcurrencyLimit::sequential()
        };

        let format_name = args
            .format
            .clone()
            .or_else(|| env.format.clone())
            .unwrap_or_else(|| file.format.clone());
        let format = format_name.parse::<OutputFormat>().map_err(anyhow::Error::msg)?;

        let program = args
            .engine
            .clone()
            .or_else(|| env.engine.clone())
            .unwrap_or_else(|| file.engine.program.clone());
        if program.trim().is_empty() {
            anyhow::bail!("Engine program must not be empty");
        }
        let server_url = env
            .server_url
            .clone()
            .unwrap_or_else(|| file.server_url.clone());

        let mut engine = CommandEngine::new(program)
            .args(file.engine.args.iter().cloned())
            .variable("DOC_PATH", server_url);
        if args.debug {
            engine = engine.arg("--debug");
        }
        if args.show_text {
            engine = engine.arg("--show-text");
        }
        if !headless {
            engine = engine.arg("--no-headless");
        }

        let test_dir = args
            .dir
            .clone()
            .or_else(|| env.test_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| file.test_dir.clone());

        Ok(Self {
            files: args.files.clone(),
            test_dir,
            limit,
            engine,
            format,
            debug: args.debug,
            headless,
            output: args.output.clone(),
            save: args.save,
            results_dir: file.results_dir.clone(),
        })
    }
}
