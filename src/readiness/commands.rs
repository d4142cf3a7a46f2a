//! Commands carried by a tracker's queue.
//!
//! Externally observed events, continuations of the tracker's own asynchronous
//! work, and control requests all travel through the same queue, so a single
//! worker applies them in arrival order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::oneshot;

use crate::events::TrackerMessage;
use crate::models::{DeploymentPlanId, SubscriptionKey, TaskId};

/// Type alias for command response channels
pub type CommandResponder<T> = oneshot::Sender<T>;

#[derive(Debug)]
pub enum TrackerCommand {
    /// An event to dispatch
    Message(TrackerMessage),
    /// Report the current tracker state
    Snapshot {
        resp: CommandResponder<TrackerSnapshot>,
    },
    /// Release every subscription and stop the worker
    Stop {
        resp: CommandResponder<TrackerSnapshot>,
    },
}

/// Point-in-time copy of a tracker's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub plan_id: DeploymentPlanId,
    pub healthy: BTreeSet<TaskId>,
    pub ready: BTreeSet<TaskId>,
    pub open_subscriptions: BTreeSet<SubscriptionKey>,
    pub stopped: bool,
}

impl TrackerSnapshot {
    pub fn is_healthy(&self, task_id: &TaskId) -> bool {
        self.healthy.contains(task_id)
    }

    pub fn is_ready(&self, task_id: &TaskId) -> bool {
        self.ready.contains(task_id)
    }

    /// Open subscriptions belonging to one task
    pub fn subscriptions_for(&self, task_id: &TaskId) -> Vec<&SubscriptionKey> {
        self.open_subscriptions
            .iter()
            .filter(|key| &key.task_id == task_id)
            .collect()
    }
}
