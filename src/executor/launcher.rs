//! Single-job launcher
//!
//! Wraps one work item into an async execution and turns whatever the
//! engine does into exactly one [`Outcome`].

use std::fmt;
use tracing::{debug, warn};

use super::TestEngine;
use crate::models::{Outcome, TestRecord, WorkItem};
use crate::utils::Timer;

/// Handle of one admitted execution
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A finished job and the record it produced
#[derive(Clone, Debug)]
pub struct Completion {
    pub job: JobId,
    pub record: TestRecord,
}

/// Execute `item` on `engine`.
///
/// Engine errors are captured as [`Outcome::Errored`]; this never fails.
pub async fn launch<E>(job: JobId, item: WorkItem, engine: &E) -> Completion
where
    E: TestEngine + ?Sized,
{
    let timer = Timer::start(format!("job {job} {item}"));

    let outcome = match engine.run_test(&item).await {
        Ok(report) => Outcome::from_report(report),
        Err(e) => {
            warn!("Engine error while running {}: {}", item, e);
            Outcome::errored(e.to_string())
        }
    };

    let duration_ms = timer.elapsed_ms();
    debug!("Job {} finished {} in {}ms", job, outcome.kind(), duration_ms);

    Completion {
        job,
        record: TestRecord::new(item, outcome, duration_ms),
    }
}
