//! Data models for batch test runs
//!
//! This module contains the work items, outcomes and result buckets used
//! throughout the application.

mod outcome;
mod result_set;
mod work_item;

pub use outcome::{EngineReport, Outcome, OutcomeKind};
pub use result_set::{ResultSet, TestRecord};
pub use work_item::{ConcurrencyLimit, WorkItem};
