//! # Readiness Check Scheduler
//!
//! Starts the readiness-check cycle of a task that just became healthy:
//!
//! 1. Look the task up in the external task tracker (asynchronously).
//! 2. Without a task or launch data, stop silently; the task was most likely
//!    killed before its checks could be built.
//! 3. Otherwise re-enter the tracker queue with a begin-check signal. When the
//!    worker handles it, derive the check specs, start one result stream per
//!    spec, and register each in the subscription registry.
//!
//! Lookup results and check results never touch tracker state directly; they
//! are delivered as commands on the tracker's own queue.

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::channels::WeakTrackerCommandSender;
use super::commands::TrackerCommand;
use super::subscriptions::{SubscriptionHandle, SubscriptionRegistry};
use crate::error::Result;
use crate::events::{BeginCheck, TrackerMessage};
use crate::logging::log_check_operation;
use crate::models::{AppDefinition, CheckResult, CheckSpec, Task, TaskId};

/// External store of task instances
#[async_trait]
pub trait TaskTracker: Send + Sync + 'static {
    /// Look a task up by id; `Ok(None)` when the tracker does not know it
    async fn task(&self, task_id: &TaskId) -> Result<Option<Task>>;
}

/// External subsystem that runs readiness checks
///
/// Interval, timeout and retry behaviour belong to the executor; the tracker
/// only starts streams and consumes their results. Dropping the returned
/// stream must stop the check.
pub trait ReadinessCheckExecutor: Send + Sync + 'static {
    fn execute(&self, spec: CheckSpec) -> BoxStream<'static, CheckResult>;
}

pub struct CheckScheduler {
    app: Arc<AppDefinition>,
    task_tracker: Arc<dyn TaskTracker>,
    executor: Arc<dyn ReadinessCheckExecutor>,
    sender: WeakTrackerCommandSender,
    shutdown: CancellationToken,
}

impl CheckScheduler {
    pub fn new(
        app: Arc<AppDefinition>,
        task_tracker: Arc<dyn TaskTracker>,
        executor: Arc<dyn ReadinessCheckExecutor>,
        sender: WeakTrackerCommandSender,
    ) -> Self {
        Self {
            app,
            task_tracker,
            executor,
            sender,
            shutdown: CancellationToken::new(),
        }
    }

    /// Issue the asynchronous task lookup for a task that just became healthy
    pub fn initiate(&self, task_id: TaskId) {
        let task_tracker = self.task_tracker.clone();
        let sender = self.sender.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let lookup = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return,
                lookup = task_tracker.task(&task_id) => lookup,
            };

            let begin = match lookup {
                Ok(Some(task)) => match task.launch_data.clone() {
                    Some(launch_data) => BeginCheck { task, launch_data },
                    None => {
                        debug!(
                            task_id = %task_id,
                            "Task has no launch data, no readiness check scheduled"
                        );
                        return;
                    }
                },
                Ok(None) => {
                    debug!(task_id = %task_id, "Task not found, no readiness check scheduled");
                    return;
                }
                Err(error) => {
                    warn!(
                        task_id = %task_id,
                        error = %error,
                        "Task lookup failed, no readiness check scheduled"
                    );
                    return;
                }
            };

            let Some(sender) = sender.upgrade() else {
                debug!(task_id = %task_id, "Tracker gone before task lookup completed");
                return;
            };
            let command = TrackerCommand::Message(TrackerMessage::BeginCheck(begin));
            if sender.send(command).await.is_err() {
                debug!(task_id = %task_id, "Tracker stopped before task lookup completed");
            }
        });
    }

    /// Derive check specs for a launched task and open one subscription per spec
    ///
    /// Returns the names of the checks whose subscriptions were registered.
    pub fn schedule(&self, begin: &BeginCheck, registry: &mut SubscriptionRegistry) -> Vec<String> {
        let specs = self
            .app
            .readiness_check_specs(&begin.task, &begin.launch_data);

        let mut scheduled = Vec::with_capacity(specs.len());
        for spec in specs {
            let key = spec.subscription_key();
            log_check_operation(
                "schedule",
                &spec.task_id,
                Some(&spec.check_name),
                "started",
                Some(&spec.url),
            );
            let handle = self.start_stream(spec);
            if registry.add(key.clone(), handle).is_ok() {
                scheduled.push(key.check_name);
            }
        }
        scheduled
    }

    /// Start one check stream, relaying every result into the tracker queue
    fn start_stream(&self, spec: CheckSpec) -> SubscriptionHandle {
        let token = self.shutdown.child_token();
        let cancelled = token.clone();
        let sender = self.sender.clone();
        let mut results = self.executor.execute(spec);

        let task = tokio::spawn(async move {
            loop {
                let result = tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    next = results.next() => match next {
                        Some(result) => result,
                        None => break,
                    },
                };

                let Some(sender) = sender.upgrade() else { break };
                let command = TrackerCommand::Message(TrackerMessage::CheckResult(result));
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    sent = sender.send(command) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        SubscriptionHandle::new(token, task)
    }

    /// Cancel in-flight lookups and every stream started by this scheduler
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
