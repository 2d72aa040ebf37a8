//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "GUI_TESTER";

/// Unprefixed variable holding the documentation server URL
const SERVER_URL_VAR: &str = "SERVER_URL";

/// Configuration read from environment variables
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvConfig {
    /// Server URL from SERVER_URL
    pub server_url: Option<String>,
    /// Job count from GUI_TESTER_JOBS, validated when settings are resolved
    pub jobs: Option<String>,
    /// Engine program from GUI_TESTER_ENGINE
    pub engine: Option<String>,
    /// Output format from GUI_TESTER_FORMAT
    pub format: Option<String>,
    /// Test directory from GUI_TESTER_TEST_DIR
    pub test_dir: Option<String>,
    /// Config file from GUI_TESTER_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from the process environment
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefixed = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));

        Self {
            server_url: lookup(SERVER_URL_VAR),
            jobs: prefixed("JOBS"),
            engine: prefixed("ENGINE"),
            format: prefixed("FORMAT"),
            test_dir: prefixed("TEST_DIR"),
            config_file: prefixed("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.server_url.is_some()
            || self.jobs.is_some()
            || self.engine.is_some()
            || self.format.is_some()
            || self.test_dir.is_some()
            || self.config_file.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        if !self.has_any() {
            println!("  (no overrides set)");
            return;
        }
        println!("  {SERVER_URL_VAR}:           {:?}", self.server_url);
        println!("  {}_JOBS:       {:?}", ENV_PREFIX, self.jobs);
        println!("  {}_ENGINE:     {:?}", ENV_PREFIX, self.engine);
        println!("  {}_FORMAT:     {:?}", ENV_PREFIX, self.format);
        println!("  {}_TEST_DIR:   {:?}", ENV_PREFIX, self.test_dir);
        println!("  {}_CONFIG:     {:?}", ENV_PREFIX, self.config_file);
    }
}

/// Print all recognized environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {SERVER_URL_VAR}              Documentation server (default http://127.0.0.1:3000)");
    println!("  {ENV_PREFIX}_JOBS        Concurrent jobs (0 or less runs all at once)");
    println!("  {ENV_PREFIX}_ENGINE      Test engine executable");
    println!("  {ENV_PREFIX}_FORMAT      Output format (table, json, json-pretty, summary)");
    println!("  {ENV_PREFIX}_TEST_DIR    Directory containing .goml files");
    println!("  {ENV_PREFIX}_CONFIG      Path to configuration file");
}
