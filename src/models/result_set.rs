//! Result buckets for a batch run
//!
//! Records are appended in completion order and re-sorted by identifier
//! once the run is over, so reports do not depend on execution timing.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Outcome, OutcomeKind, WorkItem};

/// Outcome of one work item together with its identifier
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub item: WorkItem,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl TestRecord {
    pub fn new(item: WorkItem, outcome: Outcome, duration_ms: u64) -> Self {
        Self {
            item,
            duration_ms,
            outcome,
        }
    }
}

impl fmt::Display for TestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.item, self.outcome.text())
    }
}

/// Successful, failed and errored buckets of a run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub successful: Vec<TestRecord>,
    pub failed: Vec<TestRecord>,
    pub errored: Vec<TestRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the bucket matching its outcome
    pub fn record(&mut self, record: TestRecord) {
        self.bucket_mut(record.outcome.kind()).push(record);
    }

    fn bucket_mut(&mut self, kind: OutcomeKind) -> &mut Vec<TestRecord> {
        match kind {
            OutcomeKind::Successful => &mut self.successful,
            OutcomeKind::Failed => &mut self.failed,
            OutcomeKind::Errored => &mut self.errored,
        }
    }

    /// Sort every bucket by identifier.
    ///
    /// The sort is stable, so finalizing twice leaves the buckets unchanged.
    pub fn finalize(&mut self) {
        for bucket in [&mut self.successful, &mut self.failed, &mut self.errored] {
            bucket.sort_by(|a, b| a.item.cmp(&b.item));
        }
    }

    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len() + self.errored.len()
    }

    /// Whether anything landed outside the successful bucket
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || !self.errored.is_empty()
    }

    /// Every record, in successful / failed / errored order
    pub fn iter(&self) -> impl Iterator<Item = &TestRecord> {
        self.successful
            .iter()
            .chain(self.failed.iter())
            .chain(self.errored.iter())
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.iter().map(|r| r.duration_ms).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EngineReport;

    fn record(id: &str, outcome: Outcome) -> TestRecord {
        TestRecord::new(WorkItem::new(id), outcome, 10)
    }

    #[test]
    fn test_record_routes_by_outcome() {
        let mut results = ResultSet::new();
        results.record(record("a.goml", Outcome::from_report(EngineReport::passed(""))));
        results.record(record(
            "b.goml",
            Outcome::from_report(EngineReport::new("bad", 1)),
        ));
        results.record(record("c.goml", Outcome::errored("crash")));

        assert_eq!(results.successful.len(), 1);
        assert_eq!(results.failed.len(), 1);
        assert_eq!(results.errored.len(), 1);
        assert_eq!(results.total(), 3);
        assert!(results.has_failures());
        assert_eq!(results.total_duration_ms(), 30);
    }

    #[test]
    fn test_finalize_sorts_by_identifier() {
        let mut results = ResultSet::new();
        for id in ["z.goml", "a.goml", "m.goml"] {
            results.record(record(id, Outcome::errored("x")));
        }
        results.finalize();

        let ids: Vec<_> = results.errored.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(ids, vec!["a.goml", "m.goml", "z.goml"]);
    }

    #[test]
    fn test_finalize_twice_is_noop() {
        let mut results = ResultSet::new();
        for id in ["b.goml", "c.goml", "a.goml"] {
            results.record(record(id, Outcome::from_report(EngineReport::passed(id))));
        }
        results.finalize();
        let once = results.clone();
        results.finalize();
        assert_eq!(results, once);
    }

    #[test]
    fn test_empty_set_has_no_failures() {
        let results = ResultSet::new();
        assert!(!results.has_failures());
        assert_eq!(results.total(), 0);
    }
}
