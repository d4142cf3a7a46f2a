//! # System Constants
//!
//! Scheduler status kinds and lifecycle event names used by the readiness
//! tracker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle event names published through the [`EventPublisher`](crate::events::EventPublisher)
pub mod events {
    pub const TASK_HEALTHY: &str = "readiness.task_healthy";
    pub const TASK_READY: &str = "readiness.task_ready";
    pub const CHECKS_SCHEDULED: &str = "readiness.checks_scheduled";
    pub const CHECK_UPDATED: &str = "readiness.check_updated";
    pub const SUBSCRIPTION_RELEASED: &str = "readiness.subscription_released";
    pub const TRACKER_STOPPED: &str = "readiness.tracker_stopped";
}

/// Status kinds reported by the cluster scheduler for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatusKind {
    Staging,
    Starting,
    Running,
    Finished,
    Failed,
    Killing,
    Killed,
    Lost,
    Error,
}

impl TaskStatusKind {
    /// Check if this status means the task is no longer alive
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished | Self::Failed | Self::Killed | Self::Lost | Self::Error
        )
    }

    /// Check if this is the status that qualifies a task for readiness tracking
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for TaskStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staging => write!(f, "staging"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Finished => write!(f, "finished"),
            Self::Failed => write!(f, "failed"),
            Self::Killing => write!(f, "killing"),
            Self::Killed => write!(f, "killed"),
            Self::Lost => write!(f, "lost"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for TaskStatusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staging" => Ok(Self::Staging),
            "starting" => Ok(Self::Starting),
            "running" => Ok(Self::Running),
            "finished" => Ok(Self::Finished),
            "failed" => Ok(Self::Failed),
            "killing" => Ok(Self::Killing),
            "killed" => Ok(Self::Killed),
            "lost" => Ok(Self::Lost),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid task status kind: {s}")),
        }
    }
}
