//! Test-execution engine adapter
//!
//! The runner treats the engine as an opaque async operation. The default
//! implementation shells out to the `browser-ui-test` command line tool.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::models::{EngineReport, WorkItem};

/// Default engine executable
pub const DEFAULT_ENGINE: &str = "browser-ui-test";

/// Default value of the `DOC_PATH` variable handed to the engine
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Engine errors, as opposed to test failures
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` was terminated by a signal while running {item}\n{output}")]
    Terminated {
        program: String,
        item: WorkItem,
        output: String,
    },
}

/// Something that can execute one test file
pub trait TestEngine: Send + Sync {
    /// Run the test and report its failure count.
    ///
    /// An `Err` means the engine itself broke, not that the test failed.
    fn run_test<'a>(
        &'a self,
        item: &'a WorkItem,
    ) -> BoxFuture<'a, Result<EngineReport, EngineError>>;
}

/// Engine that spawns one process per test file.
///
/// The process exit code is the number of failed assertions: zero is a
/// pass, anything above zero is a failure.
#[derive(Clone, Debug)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    variables: Vec<(String, String)>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Define a `--variable NAME VALUE` pair for every test
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push((name.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for one test file
    pub fn command_args(&self, item: &WorkItem) -> Vec<String> {
        let mut args = self.args.clone();
        for (name, value) in &self.variables {
            args.push("--variable".to_string());
            args.push(name.clone());
            args.push(value.clone());
        }
        args.push("--test-file".to_string());
        args.push(item.to_string());
        args
    }

    async fn execute(&self, item: &WorkItem) -> Result<EngineReport, EngineError> {
        let args = self.command_args(item);
        debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        match output.status.code() {
            Some(code) => Ok(EngineReport::new(text, code.unsigned_abs())),
            None => Err(EngineError::Terminated {
                program: self.program.clone(),
                item: item.clone(),
                output: text,
            }),
        }
    }
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE).variable("DOC_PATH", DEFAULT_SERVER_URL)
    }
}

impl TestEngine for CommandEngine {
    fn run_test<'a>(
        &'a self,
        item: &'a WorkItem,
    ) -> BoxFuture<'a, Result<EngineReport, EngineError>> {
        self.execute(item).boxed()
    }
}
