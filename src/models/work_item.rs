//! Work item and concurrency limit models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One unit of schedulable work, identified by its test file path
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItem(String);

#[cfg(test)]
impl WorkItem {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Path> for WorkItem {
    fn from(path: &Path) -> Self {
        Self(path.display().to_string())
    }
}

/// Maximum number of simultaneous executions for a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConcurrencyLimit {
    /// Every work item is admitted at once
    #[default]
    Unbounded,
    /// At most this many executions are in flight
    Max(usize),
}

impl ConcurrencyLimit {
    /// Interpret a configured job count; zero or negative means no explicit cap
    pub fn from_jobs(jobs: i64) -> Self {
        if jobs <= 0 {
            ConcurrencyLimit::Unbounded
        } else {
            ConcurrencyLimit::Max(jobs as usize)
        }
    }

    /// Strictly sequential execution
    pub fn sequential() -> Self {
        ConcurrencyLimit::Max(1)
    }

    /// Resolve to a concrete slot count for `total` work items.
    ///
    /// A cap above the batch size admits the same as the batch size.
    pub fn resolve(self, total: usize) -> usize {
        let total = total.max(1);
        match self {
            ConcurrencyLimit::Unbounded => total,
            ConcurrencyLimit::Max(n) => n.clamp(1, total),
        }
    }
}

impl fmt::Display for ConcurrencyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcurrencyLimit::Unbounded => write!(f, "unbounded"),
            ConcurrencyLimit::Max(n) => write!(f, "{n}"),
        }
    }
}
