#![allow(dead_code)]

pub mod mocks;
pub mod strategies;

pub use mocks::*;
pub use strategies::*;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use task_readiness::config::{ReadyHookPolicy, TrackerConfig};
use task_readiness::events::{
    HealthStatusChanged, PublishedEvent, ReadinessCheckUpdate, SchedulerStatusUpdate,
};
use task_readiness::models::{
    AppDefinition, DeploymentPlanId, HealthCheckDefinition, LaunchData, ReadinessCheckDefinition,
    Task, TaskId,
};
use task_readiness::readiness::{
    ReadinessTracker, ReadinessTrackerHandle, ReadyTaskCollector, TaskTracker,
    TrackerCollaborators,
};
use task_readiness::EventPublisher;

pub const APP: &str = "/web";
pub const VERSION: &str = "2024-06-01T12:00:00Z";

/// App definition for `/web` with one `http` port
pub fn app(health_checked: bool, readiness_checks: &[&str]) -> AppDefinition {
    let mut app = AppDefinition::new(APP, VERSION).with_port_names(["http"]);
    if health_checked {
        app = app.with_health_check(HealthCheckDefinition::http("/health"));
    }
    for name in readiness_checks {
        app = app.with_readiness_check(
            ReadinessCheckDefinition::new(*name, "http").with_path(format!("/{name}")),
        );
    }
    app
}

pub fn launched_task(id: &str) -> Task {
    Task::new(TaskId::new(id), APP.into(), VERSION)
        .with_launch_data(LaunchData::new("agent-1.example.com", vec![31000]))
}

pub fn running(id: &str) -> SchedulerStatusUpdate {
    SchedulerStatusUpdate::running(TaskId::new(id), APP.into(), VERSION)
}

pub fn alive(id: &str) -> HealthStatusChanged {
    HealthStatusChanged::new(APP.into(), TaskId::new(id), VERSION, true)
}

pub fn not_alive(id: &str) -> HealthStatusChanged {
    HealthStatusChanged::new(APP.into(), TaskId::new(id), VERSION, false)
}

/// A started tracker wired to in-memory collaborators
pub struct Harness {
    pub handle: ReadinessTrackerHandle,
    pub collector: Arc<ReadyTaskCollector>,
    pub executor: Arc<ScriptedExecutor>,
    pub updates: mpsc::UnboundedReceiver<ReadinessCheckUpdate>,
    pub events: broadcast::Receiver<PublishedEvent>,
}

impl Harness {
    pub fn start(app: AppDefinition, task_tracker: Arc<dyn TaskTracker>) -> Self {
        Self::start_with_policy(app, task_tracker, ReadyHookPolicy::OncePerTask)
    }

    pub fn start_with_policy(
        app: AppDefinition,
        task_tracker: Arc<dyn TaskTracker>,
        policy: ReadyHookPolicy,
    ) -> Self {
        let collector = Arc::new(ReadyTaskCollector::new());
        let executor = Arc::new(ScriptedExecutor::new());
        let (updates_tx, updates) = mpsc::unbounded_channel();
        let publisher = EventPublisher::new(256);
        let events = publisher.subscribe();

        let config = TrackerConfig {
            ready_hook_policy: policy,
            release_timeout_ms: 500,
            ..TrackerConfig::default()
        };
        let collaborators = TrackerCollaborators::new(
            task_tracker,
            executor.clone(),
            Arc::new(updates_tx),
            collector.clone(),
        )
        .with_publisher(publisher);

        let handle =
            ReadinessTracker::new(DeploymentPlanId::new(), Arc::new(app), config, collaborators)
                .start();

        Self {
            handle,
            collector,
            executor,
            updates,
            events,
        }
    }

    /// Wait for the worker to drain everything queued so far
    pub async fn settle(&self) {
        self.handle.snapshot().await.expect("tracker running");
    }

    pub fn drain_updates(&mut self) -> Vec<ReadinessCheckUpdate> {
        let mut drained = Vec::new();
        while let Ok(update) = self.updates.try_recv() {
            drained.push(update);
        }
        drained
    }

    pub fn drain_event_names(&mut self) -> Vec<&'static str> {
        let mut names = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            names.push(event.name);
        }
        names
    }
}

/// Poll `condition` until it holds or two seconds pass
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if condition().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Bound a wait so a broken tracker fails the test instead of hanging it
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("timed out")
}
