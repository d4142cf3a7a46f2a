//! Readiness check specs, results, and the keys their subscriptions live under.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::identifiers::TaskId;

/// A named readiness check resolved for one task
///
/// One task gets one spec per readiness check configured on its app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSpec {
    pub task_id: TaskId,
    pub check_name: String,
    pub url: String,
    pub interval: Duration,
    pub timeout: Duration,
    pub http_status_codes_for_ready: Vec<u16>,
    pub preserve_last_response: bool,
}

impl CheckSpec {
    pub fn subscription_key(&self) -> SubscriptionKey {
        SubscriptionKey::new(self.task_id.clone(), self.check_name.clone())
    }
}

/// Last HTTP response observed by a readiness check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// One observation from a running check's result stream
///
/// A stream may emit several not-ready results before it reports ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub task_id: TaskId,
    pub check_name: String,
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_response: Option<HttpResponse>,
}

impl CheckResult {
    pub fn new(task_id: TaskId, check_name: impl Into<String>, ready: bool) -> Self {
        Self {
            task_id,
            check_name: check_name.into(),
            ready,
            last_response: None,
        }
    }

    pub fn with_last_response(mut self, response: HttpResponse) -> Self {
        self.last_response = Some(response);
        self
    }

    pub fn subscription_key(&self) -> SubscriptionKey {
        SubscriptionKey::new(self.task_id.clone(), self.check_name.clone())
    }
}

/// Unique key of one open check subscription: (task, check name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionKey {
    pub task_id: TaskId,
    pub check_name: String,
}

impl SubscriptionKey {
    pub fn new(task_id: TaskId, check_name: impl Into<String>) -> Self {
        Self {
            task_id,
            check_name: check_name.into(),
        }
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.task_id, self.check_name)
    }
}
