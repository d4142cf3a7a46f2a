//! # Readiness Tracker
//!
//! One tracker per (deployment plan, app definition). The tracker is an actor:
//! a single worker task owns the progress state and the subscription registry
//! and consumes one queue. Inbound events from the embedding step, task
//! lookup completions, and check results all arrive on that queue, so every
//! state transition is applied in arrival order with no interleaving.
//!
//! ```text
//! handle.send(event) ──┐
//! task lookup ─────────┼──► queue ──► worker ──► Dispatcher ──► Effects
//! check streams ───────┘                            │
//!                         notifier / ready hook ◄───┘
//! ```
//!
//! Only [`ReadinessTrackerHandle`]s hold strong senders. Dropping the last
//! handle closes the queue and the worker releases everything it holds.

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info};

use super::channels::{ChannelFactory, TrackerCommandReceiver, TrackerCommandSender};
use super::commands::{TrackerCommand, TrackerSnapshot};
use super::dispatcher::{DispatchMode, Dispatcher};
use super::hooks::{DeploymentNotifier, TaskReadyHook};
use super::progress::{Effect, ProgressTracker};
use super::scheduler::{CheckScheduler, ReadinessCheckExecutor, TaskTracker};
use super::subscriptions::SubscriptionRegistry;
use crate::config::TrackerConfig;
use crate::error::{ReadinessError, Result};
use crate::events::{
    EventPublisher, InboundEvent, ReadinessCheckUpdate, ReadinessEvent, TrackerMessage,
};
use crate::logging::{log_check_operation, log_task_transition};
use crate::models::{AppDefinition, DeploymentPlanId};

/// External collaborators a tracker talks to
#[derive(Clone)]
pub struct TrackerCollaborators {
    pub task_tracker: Arc<dyn TaskTracker>,
    pub executor: Arc<dyn ReadinessCheckExecutor>,
    pub notifier: Arc<dyn DeploymentNotifier>,
    pub ready_hook: Arc<dyn TaskReadyHook>,
    /// Optional observer channel for lifecycle events
    pub publisher: Option<EventPublisher>,
}

impl TrackerCollaborators {
    pub fn new(
        task_tracker: Arc<dyn TaskTracker>,
        executor: Arc<dyn ReadinessCheckExecutor>,
        notifier: Arc<dyn DeploymentNotifier>,
        ready_hook: Arc<dyn TaskReadyHook>,
    ) -> Self {
        Self {
            task_tracker,
            executor,
            notifier,
            ready_hook,
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: EventPublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }
}

/// Unstarted tracker for one deployment plan and app definition
pub struct ReadinessTracker {
    plan_id: DeploymentPlanId,
    app: Arc<AppDefinition>,
    config: TrackerConfig,
    collaborators: TrackerCollaborators,
}

impl ReadinessTracker {
    pub fn new(
        plan_id: DeploymentPlanId,
        app: Arc<AppDefinition>,
        config: TrackerConfig,
        collaborators: TrackerCollaborators,
    ) -> Self {
        Self {
            plan_id,
            app,
            config,
            collaborators,
        }
    }

    /// Spawn the worker and return a handle to its queue
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> ReadinessTrackerHandle {
        let (sender, receiver) =
            ChannelFactory::tracker_command_channel(self.config.event_buffer_size.max(1));

        let dispatcher = Dispatcher::new(self.app.clone());
        let mode = dispatcher.mode();
        let scheduler = CheckScheduler::new(
            self.app.clone(),
            self.collaborators.task_tracker,
            self.collaborators.executor,
            sender.downgrade(),
        );
        let final_snapshot = Arc::new(Mutex::new(None));

        let worker = TrackerWorker {
            plan_id: self.plan_id,
            dispatcher,
            progress: ProgressTracker::new(self.config.ready_hook_policy),
            registry: SubscriptionRegistry::new(),
            scheduler,
            notifier: self.collaborators.notifier,
            ready_hook: self.collaborators.ready_hook,
            publisher: self.collaborators.publisher,
            release_timeout: self.config.release_timeout(),
            final_snapshot: final_snapshot.clone(),
        };

        info!(
            plan_id = %self.plan_id,
            app_id = %self.app.id,
            version = %self.app.version,
            mode = %mode,
            "Starting readiness tracker"
        );
        tokio::spawn(worker.run(receiver));

        ReadinessTrackerHandle {
            plan_id: self.plan_id,
            mode,
            sender,
            final_snapshot,
        }
    }
}

/// Cloneable handle to a running tracker
#[derive(Debug, Clone)]
pub struct ReadinessTrackerHandle {
    plan_id: DeploymentPlanId,
    mode: DispatchMode,
    sender: TrackerCommandSender,
    final_snapshot: Arc<Mutex<Option<TrackerSnapshot>>>,
}

impl ReadinessTrackerHandle {
    pub fn plan_id(&self) -> DeploymentPlanId {
        self.plan_id
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn is_stopped(&self) -> bool {
        self.sender.is_closed()
    }

    /// Enqueue an inbound event; fails with `TrackerStopped` after stop
    pub async fn send(&self, event: impl Into<InboundEvent>) -> Result<()> {
        let message = TrackerMessage::from(event.into());
        self.sender
            .send(TrackerCommand::Message(message))
            .await
            .map_err(|_| ReadinessError::TrackerStopped)
    }

    /// Current state, or the final state once the tracker has stopped
    pub async fn snapshot(&self) -> Result<TrackerSnapshot> {
        let (resp, rx) = oneshot::channel();
        if self.sender.send(TrackerCommand::Snapshot { resp }).await.is_ok() {
            if let Ok(snapshot) = rx.await {
                return Ok(snapshot);
            }
        }
        self.stopped_snapshot()
    }

    /// Release every open subscription and stop the worker
    ///
    /// Idempotent: later calls return the same final snapshot.
    pub async fn stop(&self) -> Result<TrackerSnapshot> {
        let (resp, rx) = oneshot::channel();
        if self.sender.send(TrackerCommand::Stop { resp }).await.is_ok() {
            if let Ok(snapshot) = rx.await {
                return Ok(snapshot);
            }
        }
        self.stopped_snapshot()
    }

    fn stopped_snapshot(&self) -> Result<TrackerSnapshot> {
        self.final_snapshot
            .lock()
            .clone()
            .ok_or(ReadinessError::TrackerStopped)
    }
}

struct TrackerWorker {
    plan_id: DeploymentPlanId,
    dispatcher: Dispatcher,
    progress: ProgressTracker,
    registry: SubscriptionRegistry,
    scheduler: CheckScheduler,
    notifier: Arc<dyn DeploymentNotifier>,
    ready_hook: Arc<dyn TaskReadyHook>,
    publisher: Option<EventPublisher>,
    release_timeout: Duration,
    final_snapshot: Arc<Mutex<Option<TrackerSnapshot>>>,
}

impl TrackerWorker {
    async fn run(mut self, mut receiver: TrackerCommandReceiver) {
        while let Some(command) = receiver.recv().await {
            match command {
                TrackerCommand::Message(message) => self.handle_message(message),
                TrackerCommand::Snapshot { resp } => {
                    let _ = resp.send(self.snapshot(false));
                }
                TrackerCommand::Stop { resp } => {
                    let snapshot = self.shutdown().await;
                    let _ = resp.send(snapshot);
                    receiver.close();
                    return;
                }
            }
        }

        debug!(plan_id = %self.plan_id, "All tracker handles dropped");
        self.shutdown().await;
    }

    fn handle_message(&mut self, message: TrackerMessage) {
        let kind = message.kind();
        let task_id = message.task_id().clone();
        let effects = self.dispatcher.react(&mut self.progress, message);

        if effects.is_empty() {
            debug!(
                plan_id = %self.plan_id,
                task_id = %task_id,
                kind = kind,
                "Message produced no transition"
            );
            return;
        }

        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::EnteredHealthy(task_id) => {
                log_task_transition(&task_id, "launched", "healthy", None);
                self.publish(ReadinessEvent::TaskHealthy {
                    plan_id: self.plan_id,
                    task_id,
                });
            }
            Effect::EnteredReady(task_id) => {
                log_task_transition(&task_id, "healthy", "ready", None);
                self.publish(ReadinessEvent::TaskReady {
                    plan_id: self.plan_id,
                    task_id,
                });
            }
            Effect::LookupTask(task_id) => {
                log_check_operation("lookup", &task_id, None, "initiated", None);
                self.scheduler.initiate(task_id);
            }
            Effect::OpenChecks(begin) => {
                let check_names = self.scheduler.schedule(&begin, &mut self.registry);
                if check_names.is_empty() {
                    debug!(
                        plan_id = %self.plan_id,
                        task_id = %begin.task.task_id,
                        "No readiness checks could be built for task"
                    );
                    return;
                }
                self.publish(ReadinessEvent::ChecksScheduled {
                    plan_id: self.plan_id,
                    task_id: begin.task.task_id,
                    check_names,
                });
            }
            Effect::NotifyCoordinator(result) => {
                log_check_operation(
                    "result",
                    &result.task_id,
                    Some(&result.check_name),
                    if result.ready { "ready" } else { "not_ready" },
                    None,
                );
                self.notifier.readiness_check_update(ReadinessCheckUpdate {
                    plan_id: self.plan_id,
                    result,
                });
            }
            Effect::ReleaseSubscription(key) => {
                if self.registry.remove(&key) {
                    self.publish(ReadinessEvent::SubscriptionReleased {
                        plan_id: self.plan_id,
                        key,
                    });
                }
            }
            Effect::FireReadyHook(task_id) => {
                self.ready_hook.task_ready(&task_id);
            }
        }
    }

    /// Cancel pending work, release every subscription and record the final state
    async fn shutdown(&mut self) -> TrackerSnapshot {
        self.scheduler.shutdown();
        let released = self.registry.remove_all(self.release_timeout).await;

        info!(
            plan_id = %self.plan_id,
            released_subscriptions = released,
            ready_tasks = self.progress.ready().len(),
            "Readiness tracker stopped"
        );
        self.publish(ReadinessEvent::TrackerStopped {
            plan_id: self.plan_id,
            released_subscriptions: released,
        });

        let snapshot = self.snapshot(true);
        *self.final_snapshot.lock() = Some(snapshot.clone());
        snapshot
    }

    fn snapshot(&self, stopped: bool) -> TrackerSnapshot {
        TrackerSnapshot {
            plan_id: self.plan_id,
            healthy: self.progress.healthy().iter().cloned().collect(),
            ready: self.progress.ready().iter().cloned().collect(),
            open_subscriptions: self.registry.keys().cloned().collect::<BTreeSet<_>>(),
            stopped,
        }
    }

    fn publish(&self, event: ReadinessEvent) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SchedulerStatusUpdate;
    use crate::models::{CheckResult, CheckSpec, Task, TaskId};
    use crate::readiness::hooks::ReadyTaskCollector;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream, StreamExt};
    use tokio::sync::mpsc;

    struct NoTasks;

    #[async_trait]
    impl TaskTracker for NoTasks {
        async fn task(&self, _task_id: &TaskId) -> Result<Option<Task>> {
            Ok(None)
        }
    }

    struct NeverReports;

    impl ReadinessCheckExecutor for NeverReports {
        fn execute(&self, _spec: CheckSpec) -> BoxStream<'static, CheckResult> {
            stream::pending().boxed()
        }
    }

    fn plain_tracker(
        app: AppDefinition,
    ) -> (
        ReadinessTracker,
        Arc<ReadyTaskCollector>,
        mpsc::UnboundedReceiver<ReadinessCheckUpdate>,
    ) {
        let collector = Arc::new(ReadyTaskCollector::new());
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let collaborators = TrackerCollaborators::new(
            Arc::new(NoTasks),
            Arc::new(NeverReports),
            Arc::new(updates_tx),
            collector.clone(),
        );
        let tracker = ReadinessTracker::new(
            DeploymentPlanId::new(),
            Arc::new(app),
            TrackerConfig::default(),
            collaborators,
        );
        (tracker, collector, updates_rx)
    }

    #[tokio::test]
    async fn test_running_task_without_checks_becomes_ready() {
        let (tracker, collector, _updates) = plain_tracker(AppDefinition::new("/web", "v1"));
        let handle = tracker.start();

        handle
            .send(SchedulerStatusUpdate::running(
                TaskId::new("web.1"),
                "/web".into(),
                "v1",
            ))
            .await
            .unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.is_ready(&TaskId::new("web.1")));
        assert_eq!(collector.ready_tasks(), vec![TaskId::new("web.1")]);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_rejects_later_events() {
        let (tracker, _collector, _updates) = plain_tracker(AppDefinition::new("/web", "v1"));
        let handle = tracker.start();

        let first = handle.stop().await.unwrap();
        let second = handle.stop().await.unwrap();
        assert!(first.stopped);
        assert_eq!(first, second);

        let result = handle
            .send(SchedulerStatusUpdate::running(
                TaskId::new("web.1"),
                "/web".into(),
                "v1",
            ))
            .await;
        assert_eq!(result, Err(ReadinessError::TrackerStopped));
        assert!(handle.is_stopped());
    }
}
