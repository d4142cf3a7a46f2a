use async_trait::async_trait;
use futures::channel::mpsc as feed;
use futures::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

use task_readiness::models::{CheckResult, CheckSpec, SubscriptionKey, Task, TaskId};
use task_readiness::readiness::{ReadinessCheckExecutor, TaskTracker};
use task_readiness::registry::InMemoryTaskTracker;
use task_readiness::{ReadinessError, Result};

/// Executor whose check streams are fed by the test
///
/// Each started check gets its own channel; dropping the stream on the tracker
/// side closes the channel, which is how tests observe a released subscription.
#[derive(Debug)]
pub struct ScriptedExecutor {
    started: Mutex<Vec<CheckSpec>>,
    feeds: Mutex<HashMap<SubscriptionKey, feed::UnboundedSender<CheckResult>>>,
    started_count: watch::Sender<usize>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        let (started_count, _) = watch::channel(0);
        Self {
            started: Mutex::new(Vec::new()),
            feeds: Mutex::new(HashMap::new()),
            started_count,
        }
    }

    pub fn started(&self) -> Vec<CheckSpec> {
        self.started.lock().clone()
    }

    pub fn started_for(&self, task_id: &TaskId) -> Vec<CheckSpec> {
        self.started()
            .into_iter()
            .filter(|spec| &spec.task_id == task_id)
            .collect()
    }

    /// Push a result into an open check stream; false when the stream is gone
    pub fn report(&self, task: &str, check: &str, ready: bool) -> bool {
        self.report_result(CheckResult::new(TaskId::new(task), check, ready))
    }

    pub fn report_result(&self, result: CheckResult) -> bool {
        let feeds = self.feeds.lock();
        match feeds.get(&result.subscription_key()) {
            Some(sender) => sender.unbounded_send(result).is_ok(),
            None => false,
        }
    }

    pub fn is_stream_open(&self, task: &str, check: &str) -> bool {
        let key = SubscriptionKey::new(TaskId::new(task), check);
        self.feeds
            .lock()
            .get(&key)
            .is_some_and(|sender| !sender.is_closed())
    }

    pub async fn wait_for_started(&self, count: usize) {
        let mut receiver = self.started_count.subscribe();
        let _ = receiver.wait_for(|started| *started >= count).await;
    }
}

impl ReadinessCheckExecutor for ScriptedExecutor {
    fn execute(&self, spec: CheckSpec) -> BoxStream<'static, CheckResult> {
        let (sender, receiver) = feed::unbounded();
        self.feeds.lock().insert(spec.subscription_key(), sender);
        let count = {
            let mut started = self.started.lock();
            started.push(spec);
            started.len()
        };
        self.started_count.send_replace(count);
        receiver.boxed()
    }
}

/// In-memory task tracker that counts lookups
#[derive(Debug, Default)]
pub struct CountingTaskTracker {
    pub tasks: InMemoryTaskTracker,
    lookups: AtomicUsize,
}

impl CountingTaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskTracker for CountingTaskTracker {
    async fn task(&self, task_id: &TaskId) -> Result<Option<Task>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.tasks.task(task_id).await
    }
}

/// Task tracker whose lookups always fail
#[derive(Debug, Default)]
pub struct FailingTaskTracker {
    lookups: AtomicUsize,
}

impl FailingTaskTracker {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskTracker for FailingTaskTracker {
    async fn task(&self, task_id: &TaskId) -> Result<Option<Task>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(ReadinessError::TaskLookup(format!(
            "task tracker unavailable for {task_id}"
        )))
    }
}

/// In-memory task tracker whose lookups resolve after a fixed delay
#[derive(Debug)]
pub struct SlowTaskTracker {
    pub tasks: InMemoryTaskTracker,
    delay: Duration,
    resolved: AtomicUsize,
}

impl SlowTaskTracker {
    pub fn new(delay: Duration) -> Self {
        Self {
            tasks: InMemoryTaskTracker::new(),
            delay,
            resolved: AtomicUsize::new(0),
        }
    }

    /// Lookups that ran to completion
    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskTracker for SlowTaskTracker {
    async fn task(&self, task_id: &TaskId) -> Result<Option<Task>> {
        tokio::time::sleep(self.delay).await;
        self.resolved.fetch_add(1, Ordering::SeqCst);
        self.tasks.task(task_id).await
    }
}
