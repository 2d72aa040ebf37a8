//! Output formatters for run results
//!
//! Provides table, JSON and summary output formats.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::models::{ResultSet, TestRecord};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Ok(OutputFormat::JsonPretty),
            "summary" => Ok(OutputFormat::Summary),
            other => Err(format!(
                "Unknown output format '{other}'. Valid formats: table, json, json-pretty, summary"
            )),
        }
    }
}

/// Formatted report, split by destination stream
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Goes to stdout
    pub out: String,
    /// Goes to stderr; run errors are kept here so they stand out
    pub err: String,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    passed: usize,
    failed: usize,
    errored: usize,
    duration_ms: u64,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: JsonSummary,
    #[serde(flatten)]
    results: &'a ResultSet,
}

/// Result formatter
pub struct ReportFormatter {
    format: OutputFormat,
    colorize: bool,
    show_successful: bool,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
            show_successful: false,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Also print the output of successful tests (table format)
    pub fn show_successful(mut self, show: bool) -> Self {
        self.show_successful = show;
        self
    }

    /// Format a finalized result set
    pub fn format(&self, results: &ResultSet) -> Result<Report> {
        let report = match self.format {
            OutputFormat::Table => self.format_table(results),
            OutputFormat::Json => Report {
                out: serde_json::to_string(&Self::json(results))
                    .context("Failed to serialize results")?,
                err: String::new(),
            },
            OutputFormat::JsonPretty => Report {
                out: serde_json::to_string_pretty(&Self::json(results))
                    .context("Failed to serialize results")?,
                err: String::new(),
            },
            OutputFormat::Summary => Report {
                out: self.format_summary(results),
                err: String::new(),
            },
        };
        Ok(report)
    }

    fn json(results: &ResultSet) -> JsonReport<'_> {
        JsonReport {
            summary: JsonSummary {
                total: results.total(),
                passed: results.successful.len(),
                failed: results.failed.len(),
                errored: results.errored.len(),
                duration_ms: results.total_duration_ms(),
            },
            results,
        }
    }

    fn format_table(&self, results: &ResultSet) -> Report {
        let mut report = Report::default();

        if self.show_successful {
            for record in &results.successful {
                let _ = writeln!(report.out, "{}", record.outcome.text());
            }
        }

        if !results.failed.is_empty() {
            report.out.push('\n');
            for record in &results.failed {
                let _ = writeln!(report.out, "{}", self.format_record(record, "FAILED"));
            }
        }

        // errors go last so they are the first thing seen
        if !results.errored.is_empty() {
            report.err.push_str("\n\n");
            for record in &results.errored {
                let _ = writeln!(report.err, "{}", self.format_record(record, "ERROR"));
            }
        }

        let _ = writeln!(report.out, "{}", self.format_summary(results));
        report
    }

    fn format_record(&self, record: &TestRecord, label: &str) -> String {
        let label = if self.colorize {
            format!("\x1b[31m{label}\x1b[0m")
        } else {
            label.to_string()
        };
        format!("{label} {record}")
    }

    fn format_summary(&self, results: &ResultSet) -> String {
        let passed = if self.colorize && !results.has_failures() {
            format!("\x1b[32m{} passed\x1b[0m", results.successful.len())
        } else {
            format!("{} passed", results.successful.len())
        };

        format!(
            "{} tests: {}, {} failed, {} errored ({}ms)",
            results.total(),
            passed,
            results.failed.len(),
            results.errored.len(),
            results.total_duration_ms()
        )
    }
}
