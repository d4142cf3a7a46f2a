//! # Per-Task Progress Tracker
//!
//! Owns the tracker state (the `healthy` and `ready` task sets) and applies
//! the readiness transitions. Transitions never perform I/O: each returns the
//! [`Effect`]s the worker must carry out, in order. This keeps the state
//! machine synchronous and testable without a runtime.
//!
//! Progression is monotonic: no transition removes a task from `healthy` or
//! `ready`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::config::ReadyHookPolicy;
use crate::events::BeginCheck;
use crate::models::{CheckResult, SubscriptionKey, TaskId};

/// Where a task is in its progression toward ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskReadinessState {
    /// Not yet confirmed running/healthy (or never seen)
    Launched,
    /// Confirmed running (no health checks) or healthy (health checks configured)
    Healthy,
    /// The ready hook has been considered for this task
    Ready,
}

impl fmt::Display for TaskReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Launched => write!(f, "launched"),
            Self::Healthy => write!(f, "healthy"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Task entered `healthy` for the first time
    EnteredHealthy(TaskId),
    /// Task entered `ready` for the first time
    EnteredReady(TaskId),
    /// Look the task up in the task tracker to obtain its launch data
    LookupTask(TaskId),
    /// Derive check specs and open a subscription per spec
    OpenChecks(BeginCheck),
    /// Forward a check result to the deployment coordinator
    NotifyCoordinator(CheckResult),
    /// Release the subscription of a check that reported ready
    ReleaseSubscription(SubscriptionKey),
    /// Invoke the embedding step's "task is ready" hook
    FireReadyHook(TaskId),
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    healthy: HashSet<TaskId>,
    ready: HashSet<TaskId>,
    policy: ReadyHookPolicy,
}

impl ProgressTracker {
    pub fn new(policy: ReadyHookPolicy) -> Self {
        Self {
            healthy: HashSet::new(),
            ready: HashSet::new(),
            policy,
        }
    }

    pub fn is_healthy(&self, task_id: &TaskId) -> bool {
        self.healthy.contains(task_id)
    }

    pub fn is_ready(&self, task_id: &TaskId) -> bool {
        self.ready.contains(task_id)
    }

    pub fn healthy(&self) -> &HashSet<TaskId> {
        &self.healthy
    }

    pub fn ready(&self) -> &HashSet<TaskId> {
        &self.ready
    }

    pub fn state_of(&self, task_id: &TaskId) -> TaskReadinessState {
        if self.is_ready(task_id) {
            TaskReadinessState::Ready
        } else if self.is_healthy(task_id) {
            TaskReadinessState::Healthy
        } else {
            TaskReadinessState::Launched
        }
    }

    /// Direct path: the task is running/healthy and no readiness checks are
    /// configured, so it is ready right away
    pub fn mark_running_and_ready(&mut self, task_id: TaskId) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(3);
        if self.healthy.insert(task_id.clone()) {
            effects.push(Effect::EnteredHealthy(task_id.clone()));
        }
        let newly_ready = self.ready.insert(task_id.clone());
        if newly_ready {
            effects.push(Effect::EnteredReady(task_id.clone()));
        }
        if self.should_fire_hook(newly_ready) {
            effects.push(Effect::FireReadyHook(task_id));
        }
        effects
    }

    /// Readiness-check path: the task is running/healthy, look it up so its
    /// checks can be built
    ///
    /// A task already in `healthy` has had its lookup issued; repeating it
    /// would open a second set of subscriptions under the same keys.
    pub fn mark_healthy_and_initiate_check(&mut self, task_id: TaskId) -> Vec<Effect> {
        if !self.healthy.insert(task_id.clone()) {
            return Vec::new();
        }
        vec![
            Effect::EnteredHealthy(task_id.clone()),
            Effect::LookupTask(task_id),
        ]
    }

    /// Launch data for a healthy task arrived; open its checks
    pub fn begin_check(&mut self, begin: BeginCheck) -> Vec<Effect> {
        if !self.is_healthy(&begin.task.task_id) {
            return Vec::new();
        }
        vec![Effect::OpenChecks(begin)]
    }

    /// Every check result is forwarded to the coordinator; ready results also
    /// mark the task ready
    pub fn record_check_result(&mut self, result: CheckResult) -> Vec<Effect> {
        if !result.ready {
            return vec![Effect::NotifyCoordinator(result)];
        }
        let mut effects = vec![Effect::NotifyCoordinator(result.clone())];
        effects.extend(self.mark_check_ready(&result));
        effects
    }

    /// A check reported ready: release its subscription and fire the hook
    ///
    /// Runs on every ready result, however many other checks the task has or
    /// have already reported; the hook policy decides whether repeats re-fire.
    pub fn mark_check_ready(&mut self, result: &CheckResult) -> Vec<Effect> {
        let task_id = result.task_id.clone();
        let mut effects = Vec::with_capacity(3);
        let newly_ready = self.ready.insert(task_id.clone());
        if newly_ready {
            effects.push(Effect::EnteredReady(task_id.clone()));
        }
        effects.push(Effect::ReleaseSubscription(result.subscription_key()));
        if self.should_fire_hook(newly_ready) {
            effects.push(Effect::FireReadyHook(task_id));
        }
        effects
    }

    fn should_fire_hook(&self, newly_ready: bool) -> bool {
        match self.policy {
            ReadyHookPolicy::OncePerTask => newly_ready,
            ReadyHookPolicy::EveryQualifyingEvent => true,
        }
    }
}
