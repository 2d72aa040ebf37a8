//! Bounded scheduler
//!
//! Admits work items in backlog order while fewer than `limit` executions
//! are in flight, then waits for whichever execution finishes first before
//! admitting the next one. All executions are polled from the scheduler's
//! own task, so the in-flight map and the result set are only touched
//! between suspension points.

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;
use tracing::{debug, info};

use super::{launch, Completion, JobId, TestEngine};
use crate::models::{ConcurrencyLimit, ResultSet, WorkItem};
use crate::progress::{EventSender, RunEvent};
use crate::utils::Timer;

/// Reasons a run refuses to start
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RunError {
    #[error("No test selected")]
    NoTestsSelected,

    #[error("Test `{0}` was selected more than once")]
    DuplicateWorkItem(WorkItem),
}

/// Runs a batch of tests through an engine with bounded concurrency
pub struct Scheduler<'a, E: ?Sized> {
    engine: &'a E,
    limit: ConcurrencyLimit,
    events: Option<EventSender>,
}

impl<'a, E> Scheduler<'a, E>
where
    E: TestEngine + ?Sized,
{
    pub fn new(engine: &'a E, limit: ConcurrencyLimit) -> Self {
        Self {
            engine,
            limit,
            events: None,
        }
    }

    /// Publish progress events on `events`
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Execute every item exactly once and return the sorted result set
    pub async fn run(&self, items: Vec<WorkItem>) -> Result<ResultSet, RunError> {
        if items.is_empty() {
            return Err(RunError::NoTestsSelected);
        }
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item) {
                return Err(RunError::DuplicateWorkItem(item.clone()));
            }
        }

        let total = items.len();
        let slots = self.limit.resolve(total);
        info!("Scheduling {} tests ({} concurrently)", total, slots);

        let timer = Timer::start("Batch run");
        let mut backlog: VecDeque<WorkItem> = items.into();
        let mut in_flight: HashMap<JobId, WorkItem> = HashMap::with_capacity(slots);
        let mut running = FuturesUnordered::new();
        let mut results = ResultSet::new();
        let mut next_job = 0;

        while !backlog.is_empty() {
            if in_flight.len() < slots {
                let Some(item) = backlog.pop_front() else {
                    break;
                };
                let job = JobId(next_job);
                next_job += 1;

                debug!("Admitting {} as job {} ({} in flight)", item, job, in_flight.len());
                in_flight.insert(job, item.clone());
                running.push(launch(job, item, self.engine));
            } else {
                match running.next().await {
                    Some(done) => self.complete(done, &mut in_flight, &mut results),
                    None => break,
                }
            }
        }

        debug!("Backlog empty, draining {} jobs", in_flight.len());
        while let Some(done) = running.next().await {
            self.complete(done, &mut in_flight, &mut results);
        }

        self.emit(RunEvent::RunFinished { total });
        results.finalize();

        info!(
            "{} completed in {}ms - {} passed, {} failed, {} errored",
            timer.label(),
            timer.elapsed_ms(),
            results.successful.len(),
            results.failed.len(),
            results.errored.len()
        );

        Ok(results)
    }

    fn complete(
        &self,
        done: Completion,
        in_flight: &mut HashMap<JobId, WorkItem>,
        results: &mut ResultSet,
    ) {
        if in_flight.remove(&done.job).is_none() {
            debug!("Job {} completed but was not in flight", done.job);
        }

        self.emit(RunEvent::ItemCompleted {
            item: done.record.item.clone(),
            kind: done.record.outcome.kind(),
        });
        results.record(done.record);
    }

    fn emit(&self, event: RunEvent) {
        if let Some(events) = &self.events {
            // the printer may already be gone
            let _ = events.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::engine::EngineError;
    use crate::models::{EngineReport, OutcomeKind};
    use crate::progress::event_channel;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Barrier;

    #[derive(Clone, Copy)]
    enum Script {
        Pass,
        Fail(u32),
        Crash,
    }

    /// Engine that follows a per-item script and tracks concurrency
    struct MockEngine {
        scripts: HashMap<String, Script>,
        max_delay_ms: u64,
        active: AtomicUsize,
        peak: AtomicUsize,
        log: Mutex<Vec<String>>,
        barrier: Option<Arc<Barrier>>,
    }

    impl MockEngine {
        fn new(max_delay_ms: u64) -> Self {
            Self {
                scripts: HashMap::new(),
                max_delay_ms,
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                log: Mutex::new(Vec::new()),
                barrier: None,
            }
        }

        fn script(mut self, id: &str, script: Script) -> Self {
            self.scripts.insert(id.to_string(), script);
            self
        }

        fn with_barrier(mut self, parties: usize) -> Self {
            self.barrier = Some(Arc::new(Barrier::new(parties)));
            self
        }

        fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl TestEngine for MockEngine {
        fn run_test<'a>(
            &'a self,
            item: &'a WorkItem,
        ) -> BoxFuture<'a, Result<EngineReport, EngineError>> {
            async move {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                self.log.lock().unwrap().push(format!("start {item}"));

                if let Some(barrier) = &self.barrier {
                    barrier.wait().await;
                }
                if self.max_delay_ms > 0 {
                    let delay = rand::random_range(0..=self.max_delay_ms);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }

                self.log.lock().unwrap().push(format!("end {item}"));
                self.active.fetch_sub(1, Ordering::SeqCst);

                match self.scripts.get(item.as_str()).copied().unwrap_or(Script::Pass) {
                    Script::Pass => Ok(EngineReport::passed(format!("{item} ok"))),
                    Script::Fail(n) => Ok(EngineReport::new(format!("{item} failed"), n)),
                    Script::Crash => Err(EngineError::Spawn {
                        program: "browser-ui-test".to_string(),
                        source: std::io::Error::other(format!("{item} crashed")),
                    }),
                }
            }
            .boxed()
        }
    }

    fn items(n: usize) -> Vec<WorkItem> {
        (0..n)
            .map(|i| WorkItem::new(format!("gui-tests/test-{i:02}.goml")))
            .collect()
    }

    #[tokio::test]
    async fn test_every_item_recorded_once_for_all_limits() {
        let n = 8;
        for jobs in 1..=n {
            let engine = MockEngine::new(3);
            let scheduler = Scheduler::new(&engine, ConcurrencyLimit::Max(jobs));
            let results = scheduler.run(items(n)).await.unwrap();

            assert_eq!(results.total(), n);
            let mut ids: Vec<_> = results.iter().map(|r| r.item.clone()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), n);
        }
    }

    #[tokio::test]
    async fn test_in_flight_never_exceeds_limit() {
        for jobs in [1, 2, 3, 5] {
            let engine = MockEngine::new(5);
            let scheduler = Scheduler::new(&engine, ConcurrencyLimit::Max(jobs));
            scheduler.run(items(20)).await.unwrap();
            assert!(
                engine.peak() <= jobs,
                "peak {} exceeded limit {}",
                engine.peak(),
                jobs
            );
        }
    }

    #[tokio::test]
    async fn test_limit_one_is_sequential() {
        let engine = MockEngine::new(2);
        let scheduler = Scheduler::new(&engine, ConcurrencyLimit::sequential());
        let work = items(5);
        scheduler.run(work.clone()).await.unwrap();

        let expected: Vec<String> = work
            .iter()
            .flat_map(|item| [format!("start {item}"), format!("end {item}")])
            .collect();
        assert_eq!(engine.log(), expected);
        assert_eq!(engine.peak(), 1);
    }

    #[tokio::test]
    async fn test_unbounded_admits_everything_at_once() {
        let n = 6;
        // every execution blocks until all of them have started
        let engine = MockEngine::new(0).with_barrier(n);
        let scheduler = Scheduler::new(&engine, ConcurrencyLimit::from_jobs(0));

        let results = tokio::time::timeout(Duration::from_secs(5), scheduler.run(items(n)))
            .await
            .expect("unbounded run should not wait for admission")
            .unwrap();

        assert_eq!(results.total(), n);
        assert_eq!(engine.peak(), n);
    }

    #[tokio::test]
    async fn test_cap_above_batch_size_runs_whole_batch() {
        let engine = MockEngine::new(1);
        let scheduler = Scheduler::new(&engine, ConcurrencyLimit::Max(usize::MAX));
        let results = tokio_test::assert_ok!(scheduler.run(items(2)).await);

        assert_eq!(results.total(), 2);
        assert!(engine.peak() <= 2);

        let engine = MockEngine::new(1);
        let scheduler = Scheduler::new(&engine, ConcurrencyLimit::from_jobs(i64::MAX));
        let results = tokio_test::assert_ok!(scheduler.run(items(3)).await);
        assert_eq!(results.successful.len(), 3);
    }

    #[tokio::test]
    async fn test_all_successful() {
        let engine = MockEngine::new(1);
        let scheduler = Scheduler::new(&engine, ConcurrencyLimit::Max(4));
        let results = tokio_test::assert_ok!(scheduler.run(items(9)).await);

        assert!(results.failed.is_empty());
        assert!(results.errored.is_empty());
        assert!(!results.has_failures());
    }

    #[tokio::test]
    async fn test_mixed_outcomes_with_limit_three() {
        let work = items(12);
        let engine = MockEngine::new(4)
            .script(work[3].as_str(), Script::Fail(2))
            .script(work[7].as_str(), Script::Crash);

        let results = Scheduler::new(&engine, ConcurrencyLimit::Max(3))
            .run(work.clone())
            .await
            .unwrap();

        assert_eq!(results.successful.len(), 10);
        assert_eq!(results.failed.len(), 1);
        assert_eq!(results.errored.len(), 1);
        assert_eq!(results.total(), 12);
        assert!(results.has_failures());

        assert_eq!(results.failed[0].item, work[3]);
        assert_eq!(results.failed[0].outcome.kind(), OutcomeKind::Failed);
        assert_eq!(results.errored[0].item, work[7]);
        assert!(results.errored[0].outcome.text().contains("crashed"));
    }

    #[tokio::test]
    async fn test_results_sorted_by_identifier() {
        let engine = MockEngine::new(6);
        let results = Scheduler::new(&engine, ConcurrencyLimit::Unbounded)
            .run(items(10))
            .await
            .unwrap();

        let ids: Vec<_> = results.successful.iter().map(|r| r.item.clone()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn test_no_items_is_rejected() {
        let engine = MockEngine::new(0);
        let result = Scheduler::new(&engine, ConcurrencyLimit::Unbounded)
            .run(Vec::new())
            .await;
        assert_eq!(result, Err(RunError::NoTestsSelected));
        assert!(engine.log().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_items_are_rejected_before_admission() {
        let engine = MockEngine::new(0);
        let work = vec![WorkItem::new("a.goml"), WorkItem::new("a.goml")];
        let result = Scheduler::new(&engine, ConcurrencyLimit::Unbounded)
            .run(work)
            .await;
        assert_eq!(
            result,
            Err(RunError::DuplicateWorkItem(WorkItem::new("a.goml")))
        );
        assert!(engine.log().is_empty());
    }

    #[tokio::test]
    async fn test_events_once_per_item_and_finish() {
        let (tx, mut rx) = event_channel();
        let work = items(7);
        let engine = MockEngine::new(2).script(work[0].as_str(), Script::Crash);

        Scheduler::new(&engine, ConcurrencyLimit::Max(2))
            .with_events(tx)
            .run(work)
            .await
            .unwrap();

        let mut completed = 0;
        let mut erroneous = 0;
        let mut finished = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                RunEvent::ItemCompleted { kind, .. } => {
                    completed += 1;
                    if kind != OutcomeKind::Successful {
                        erroneous += 1;
                    }
                }
                RunEvent::RunFinished { total } => finished.push(total),
            }
        }

        assert_eq!(completed, 7);
        assert_eq!(erroneous, 1);
        assert_eq!(finished, vec![7]);
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_affect_run() {
        let (tx, rx) = event_channel();
        drop(rx);
        let engine = MockEngine::new(1);
        let results = Scheduler::new(&engine, ConcurrencyLimit::Max(2))
            .with_events(tx)
            .run(items(4))
            .await
            .unwrap();
        assert_eq!(results.total(), 4);
    }
}
