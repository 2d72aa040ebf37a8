//! Progress events sent from the scheduler to the presentation layer

use tokio::sync::mpsc;

use crate::models::{OutcomeKind, WorkItem};

/// Events emitted while a batch run progresses
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunEvent {
    /// One work item reached its terminal outcome
    ItemCompleted { item: WorkItem, kind: OutcomeKind },
    /// Every work item completed
    RunFinished { total: usize },
}

pub type EventSender = mpsc::UnboundedSender<RunEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<RunEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
