//! Test execution engine
//!
//! Provides the engine adapter, the single-job launcher and the bounded
//! scheduler that drives a whole batch.

mod engine;
mod launcher;
mod scheduler;

pub use engine::{CommandEngine, TestEngine, DEFAULT_ENGINE, DEFAULT_SERVER_URL};
pub use launcher::{launch, Completion, JobId};
pub use scheduler::{RunError, Scheduler};
