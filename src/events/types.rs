//! Inbound event shapes consumed by the readiness tracker, and the outbound
//! notifications it produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{events, TaskStatusKind};
use crate::models::{
    AppId, CheckResult, DeploymentPlanId, LaunchData, SubscriptionKey, Task, TaskId,
};

/// Status update from the cluster scheduler's task-status stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerStatusUpdate {
    pub task_id: TaskId,
    pub status: TaskStatusKind,
    pub app_id: AppId,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl SchedulerStatusUpdate {
    pub fn new(
        task_id: TaskId,
        status: TaskStatusKind,
        app_id: AppId,
        version: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            status,
            app_id,
            version: version.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn running(task_id: TaskId, app_id: AppId, version: impl Into<String>) -> Self {
        Self::new(task_id, TaskStatusKind::Running, app_id, version)
    }
}

/// Health status change from the health-check subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatusChanged {
    pub app_id: AppId,
    pub task_id: TaskId,
    pub version: String,
    pub alive: bool,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatusChanged {
    pub fn new(app_id: AppId, task_id: TaskId, version: impl Into<String>, alive: bool) -> Self {
        Self {
            app_id,
            task_id,
            version: version.into(),
            alive,
            timestamp: Utc::now(),
        }
    }
}

/// Internal signal to open readiness checks for a task whose launch data is known
///
/// Only the tracker generates this for itself, once a task lookup succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct BeginCheck {
    pub task: Task,
    pub launch_data: LaunchData,
}

/// Events accepted from outside the tracker
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    SchedulerStatus(SchedulerStatusUpdate),
    HealthStatus(HealthStatusChanged),
    CheckResult(CheckResult),
}

impl From<SchedulerStatusUpdate> for InboundEvent {
    fn from(update: SchedulerStatusUpdate) -> Self {
        Self::SchedulerStatus(update)
    }
}

impl From<HealthStatusChanged> for InboundEvent {
    fn from(change: HealthStatusChanged) -> Self {
        Self::HealthStatus(change)
    }
}

impl From<CheckResult> for InboundEvent {
    fn from(result: CheckResult) -> Self {
        Self::CheckResult(result)
    }
}

/// Every message shape the dispatcher can be asked to react to
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerMessage {
    SchedulerStatus(SchedulerStatusUpdate),
    HealthStatus(HealthStatusChanged),
    CheckResult(CheckResult),
    BeginCheck(BeginCheck),
}

impl TrackerMessage {
    /// Short name of the message shape for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SchedulerStatus(_) => "scheduler_status",
            Self::HealthStatus(_) => "health_status",
            Self::CheckResult(_) => "check_result",
            Self::BeginCheck(_) => "begin_check",
        }
    }

    pub fn task_id(&self) -> &TaskId {
        match self {
            Self::SchedulerStatus(update) => &update.task_id,
            Self::HealthStatus(change) => &change.task_id,
            Self::CheckResult(result) => &result.task_id,
            Self::BeginCheck(begin) => &begin.task.task_id,
        }
    }
}

impl From<InboundEvent> for TrackerMessage {
    fn from(event: InboundEvent) -> Self {
        match event {
            InboundEvent::SchedulerStatus(update) => Self::SchedulerStatus(update),
            InboundEvent::HealthStatus(change) => Self::HealthStatus(change),
            InboundEvent::CheckResult(result) => Self::CheckResult(result),
        }
    }
}

/// Per-result notification for the deployment coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessCheckUpdate {
    pub plan_id: DeploymentPlanId,
    pub result: CheckResult,
}

/// Lifecycle events published by a tracker for observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ReadinessEvent {
    TaskHealthy {
        plan_id: DeploymentPlanId,
        task_id: TaskId,
    },
    TaskReady {
        plan_id: DeploymentPlanId,
        task_id: TaskId,
    },
    ChecksScheduled {
        plan_id: DeploymentPlanId,
        task_id: TaskId,
        check_names: Vec<String>,
    },
    CheckUpdated(ReadinessCheckUpdate),
    SubscriptionReleased {
        plan_id: DeploymentPlanId,
        key: SubscriptionKey,
    },
    TrackerStopped {
        plan_id: DeploymentPlanId,
        released_subscriptions: usize,
    },
}

impl ReadinessEvent {
    /// Get the published event name
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::TaskHealthy { .. } => events::TASK_HEALTHY,
            Self::TaskReady { .. } => events::TASK_READY,
            Self::ChecksScheduled { .. } => events::CHECKS_SCHEDULED,
            Self::CheckUpdated(_) => events::CHECK_UPDATED,
            Self::SubscriptionReleased { .. } => events::SUBSCRIPTION_RELEASED,
            Self::TrackerStopped { .. } => events::TRACKER_STOPPED,
        }
    }
}
