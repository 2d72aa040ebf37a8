//! Results storage module
//!
//! Provides persistent storage and export for finished runs.

mod storage;

pub use storage::{export, EnvironmentInfo, ResultsStorage, StoredRun};
