//! Test file discovery
//!
//! Selects the `.goml` files to run, either from an explicit list or by
//! listing the test directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::WorkItem;

/// Extension of test specification files
pub const TEST_EXTENSION: &str = "goml";

/// Default directory holding the test files
pub const DEFAULT_TEST_DIR: &str = "gui-tests";

/// Collect the work items for a run, sorted and without duplicates.
///
/// Explicit `files` win over listing `test_dir`. Relative file names that do
/// not exist as given are resolved against `test_dir`.
pub fn discover(files: &[PathBuf], test_dir: &Path) -> Result<Vec<WorkItem>> {
    let candidates = if files.is_empty() {
        list_dir(test_dir)?
    } else {
        files.iter().map(|f| resolve(f, test_dir)).collect()
    };

    let mut selected: Vec<PathBuf> = candidates.into_iter().filter(|p| is_test_file(p)).collect();
    selected.sort();
    selected.dedup();

    debug!("Selected {} test files", selected.len());
    Ok(selected.iter().map(|p| WorkItem::from(p.as_path())).collect())
}

/// Whether `path` names a test specification file
pub fn is_test_file(path: &Path) -> bool {
    path.extension().map(|e| e == TEST_EXTENSION).unwrap_or(false)
}

fn resolve(file: &Path, test_dir: &Path) -> PathBuf {
    if file.is_absolute() || file.exists() {
        file.to_path_buf()
    } else {
        test_dir.join(file)
    }
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read test directory: {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to list test directory: {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    Ok(paths)
}
