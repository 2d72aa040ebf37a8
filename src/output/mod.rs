//! Output formatting module
//!
//! Provides various output formats for run results.

mod formatter;

pub use formatter::{OutputFormat, Report, ReportFormatter};
