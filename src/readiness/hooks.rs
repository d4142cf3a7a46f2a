//! # Downstream Collaborators
//!
//! The two outbound seams of a tracker: the deployment coordinator, which
//! receives an update for every check result, and the embedding step's
//! "task is ready" hook. Both are called from the tracker's worker and must
//! not block it.

use parking_lot::Mutex;
use std::collections::HashSet;
use tokio::sync::{mpsc, watch};

use crate::events::{EventPublisher, ReadinessCheckUpdate, ReadinessEvent};
use crate::models::TaskId;

/// Invoked when a task is determined ready
///
/// Implemented by the embedding step-execution logic, e.g. to mark an
/// instance as provisioned. Closures taking `&TaskId` implement it directly.
pub trait TaskReadyHook: Send + Sync + 'static {
    fn task_ready(&self, task_id: &TaskId);
}

impl<F> TaskReadyHook for F
where
    F: Fn(&TaskId) + Send + Sync + 'static,
{
    fn task_ready(&self, task_id: &TaskId) {
        self(task_id)
    }
}

/// Receives one update per readiness check result, ready or not
pub trait DeploymentNotifier: Send + Sync + 'static {
    fn readiness_check_update(&self, update: ReadinessCheckUpdate);
}

impl DeploymentNotifier for mpsc::UnboundedSender<ReadinessCheckUpdate> {
    fn readiness_check_update(&self, update: ReadinessCheckUpdate) {
        if self.send(update).is_err() {
            tracing::debug!("Deployment coordinator channel closed, dropping readiness update");
        }
    }
}

impl DeploymentNotifier for EventPublisher {
    fn readiness_check_update(&self, update: ReadinessCheckUpdate) {
        self.publish(ReadinessEvent::CheckUpdated(update));
    }
}

/// Ready hook that records which tasks became ready
///
/// Keeps distinct task ids in first-ready order, counts raw invocations, and
/// publishes the distinct count on a watch channel so a step can wait for a
/// target number of ready instances.
#[derive(Debug)]
pub struct ReadyTaskCollector {
    state: Mutex<CollectorState>,
    ready_count: watch::Sender<usize>,
}

#[derive(Debug, Default)]
struct CollectorState {
    order: Vec<TaskId>,
    seen: HashSet<TaskId>,
    invocations: usize,
}

impl ReadyTaskCollector {
    pub fn new() -> Self {
        let (ready_count, _) = watch::channel(0);
        Self {
            state: Mutex::new(CollectorState::default()),
            ready_count,
        }
    }

    /// Distinct ready tasks in the order they first became ready
    pub fn ready_tasks(&self) -> Vec<TaskId> {
        self.state.lock().order.clone()
    }

    /// Total hook invocations, including repeats for the same task
    pub fn invocations(&self) -> usize {
        self.state.lock().invocations
    }

    pub fn is_ready(&self, task_id: &TaskId) -> bool {
        self.state.lock().seen.contains(task_id)
    }

    /// Watch the number of distinct ready tasks
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.ready_count.subscribe()
    }

    /// Wait until at least `target` distinct tasks are ready
    pub async fn wait_for(&self, target: usize) {
        let mut receiver = self.subscribe();
        // The sender lives as long as `self`, so this only ends once reached
        let _ = receiver.wait_for(|count| *count >= target).await;
    }
}

impl Default for ReadyTaskCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskReadyHook for ReadyTaskCollector {
    fn task_ready(&self, task_id: &TaskId) {
        let distinct = {
            let mut state = self.state.lock();
            state.invocations += 1;
            if state.seen.insert(task_id.clone()) {
                state.order.push(task_id.clone());
            }
            state.order.len()
        };
        self.ready_count.send_replace(distinct);
    }
}
