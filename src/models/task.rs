//! # Task Model
//!
//! The view of a task instance returned by the external task tracker. Only the
//! parts needed to build readiness checks are modelled: the owning app and
//! version, and the launch data (agent host and assigned host ports) that
//! exists once the scheduler has actually launched the instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::{AppId, TaskId};

/// A task instance as known to the task tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub app_id: AppId,
    pub version: String,
    /// Absent until the scheduler has launched the instance on an agent
    pub launch_data: Option<LaunchData>,
}

impl Task {
    pub fn new(task_id: TaskId, app_id: AppId, version: impl Into<String>) -> Self {
        Self {
            task_id,
            app_id,
            version: version.into(),
            launch_data: None,
        }
    }

    pub fn with_launch_data(mut self, launch_data: LaunchData) -> Self {
        self.launch_data = Some(launch_data);
        self
    }

    pub fn is_launched(&self) -> bool {
        self.launch_data.is_some()
    }
}

/// Placement details of a launched task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchData {
    /// Agent host the instance runs on
    pub host: String,
    /// Host ports in the order of the app's port definitions
    pub host_ports: Vec<u16>,
    pub launched_at: DateTime<Utc>,
}

impl LaunchData {
    pub fn new(host: impl Into<String>, host_ports: Vec<u16>) -> Self {
        Self {
            host: host.into(),
            host_ports,
            launched_at: Utc::now(),
        }
    }

    pub fn host_port(&self, index: usize) -> Option<u16> {
        self.host_ports.get(index).copied()
    }
}
