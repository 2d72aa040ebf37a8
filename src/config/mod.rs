//! Configuration module
//!
//! Handles loading, validating and layering configuration. Values are
//! resolved with the precedence CLI > environment > file > defaults.

mod env;
mod file;
mod settings;

pub use env::{print_env_help, EnvConfig};
pub use file::{find as find_config_file, CONFIG_LOCATIONS};
pub use settings::RunSettings;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::discovery::DEFAULT_TEST_DIR;
use crate::executor::{DEFAULT_ENGINE, DEFAULT_SERVER_URL};
use crate::output::OutputFormat;

/// Runner configuration file contents
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory scanned for `.goml` files
    pub test_dir: PathBuf,

    /// Concurrent jobs; zero or negative runs everything at once
    pub jobs: i64,

    /// Base URL handed to the engine as `DOC_PATH`
    pub server_url: String,

    /// Default output format
    pub format: String,

    /// Where saved runs are stored
    pub results_dir: Option<PathBuf>,

    /// Test engine invocation
    pub engine: EngineConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            test_dir: PathBuf::from(DEFAULT_TEST_DIR),
            jobs: 0,
            server_url: DEFAULT_SERVER_URL.to_string(),
            format: "table".to_string(),
            results_dir: None,
            engine: EngineConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if file::is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the first config file found in the standard locations
    pub fn load_default() -> Result<Self> {
        match file::find() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Load the explicitly named file, then `GUI_TESTER_CONFIG`, then the
    /// standard locations
    pub fn load_layered(explicit: Option<&Path>, env: &EnvConfig) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env.config_file.as_deref().map(PathBuf::from));
        match named {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if file::is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.engine.program.trim().is_empty() {
            anyhow::bail!("Engine program must not be empty");
        }
        if self.format.parse::<OutputFormat>().is_err() {
            anyhow::bail!(
                "Unknown output format '{}'. Valid formats: table, json, json-pretty, summary",
                self.format
            );
        }
        if self.server_url.trim().is_empty() {
            anyhow::bail!("Server URL must not be empty");
        }
        Ok(())
    }
}

/// How to invoke the test engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Executable name or path
    pub program: String,

    /// Extra arguments placed before the per-test arguments
    pub args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_ENGINE.to_string(),
            args: Vec::new(),
        }
    }
}
