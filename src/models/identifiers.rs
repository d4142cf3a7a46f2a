//! Opaque identifiers for applications, task instances and deployment plans.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one application definition (e.g. `/prod/frontend`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of one running instance of an application
///
/// Task ids are opaque to the tracker; [`TaskId::for_app`] mints ids in the
/// `{app}.{uuid}` shape the scheduler uses, which is convenient for tests and
/// embedders that launch their own instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh task id for an instance of `app_id`
    pub fn for_app(app_id: &AppId) -> Self {
        let app = app_id.as_str().trim_start_matches('/').replace('/', "_");
        Self(format!("{app}.{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of the deployment plan a tracker reports to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentPlanId(Uuid);

impl DeploymentPlanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DeploymentPlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DeploymentPlanId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DeploymentPlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
