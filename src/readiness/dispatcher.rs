//! # Event Dispatcher
//!
//! Builds the tracker's reaction function once, from the app definition, as
//! the composition of two independent choices:
//!
//! - **Entry condition**: without health checks a scheduler `running` update
//!   admits a task; with health checks an `alive` health change for a task not
//!   yet healthy does.
//! - **Progression**: without readiness checks an admitted task is ready
//!   immediately; with readiness checks it starts a readiness-check cycle, and
//!   a branch accepting check results and the internal begin-check signal is
//!   added.
//!
//! Messages outside the enabled shapes (wrong app, version, or status kind,
//! or a shape the mode does not accept) produce no effects.

use std::fmt;
use std::sync::Arc;

use super::progress::{Effect, ProgressTracker};
use crate::events::TrackerMessage;
use crate::models::{AppDefinition, TaskId};

type EntryFn = fn(&AppDefinition, &ProgressTracker, &TrackerMessage) -> Option<TaskId>;
type ProgressionFn = fn(&mut ProgressTracker, TaskId) -> Vec<Effect>;
type ResultFn = fn(&mut ProgressTracker, TrackerMessage) -> Vec<Effect>;
type Reaction = Box<dyn Fn(&mut ProgressTracker, TrackerMessage) -> Vec<Effect> + Send + Sync>;

/// Which of the four reaction functions a dispatcher was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchMode {
    /// No health checks, no readiness checks
    RunningIsReady,
    /// Health checks only
    HealthyIsReady,
    /// Readiness checks only
    RunningThenReadinessCheck,
    /// Health checks and readiness checks
    HealthyThenReadinessCheck,
}

impl DispatchMode {
    pub fn for_app(app: &AppDefinition) -> Self {
        match (app.has_health_checks(), app.has_readiness_checks()) {
            (false, false) => Self::RunningIsReady,
            (true, false) => Self::HealthyIsReady,
            (false, true) => Self::RunningThenReadinessCheck,
            (true, true) => Self::HealthyThenReadinessCheck,
        }
    }

    pub fn uses_health_checks(&self) -> bool {
        matches!(self, Self::HealthyIsReady | Self::HealthyThenReadinessCheck)
    }

    pub fn uses_readiness_checks(&self) -> bool {
        matches!(
            self,
            Self::RunningThenReadinessCheck | Self::HealthyThenReadinessCheck
        )
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunningIsReady => write!(f, "running_is_ready"),
            Self::HealthyIsReady => write!(f, "healthy_is_ready"),
            Self::RunningThenReadinessCheck => write!(f, "running_then_readiness_check"),
            Self::HealthyThenReadinessCheck => write!(f, "healthy_then_readiness_check"),
        }
    }
}

pub struct Dispatcher {
    mode: DispatchMode,
    reaction: Reaction,
}

impl Dispatcher {
    pub fn new(app: Arc<AppDefinition>) -> Self {
        let mode = DispatchMode::for_app(&app);

        let entry: EntryFn = if mode.uses_health_checks() {
            entry_on_health_alive
        } else {
            entry_on_scheduler_running
        };
        let progression: ProgressionFn = if mode.uses_readiness_checks() {
            ProgressTracker::mark_healthy_and_initiate_check
        } else {
            ProgressTracker::mark_running_and_ready
        };
        let results: Option<ResultFn> = mode
            .uses_readiness_checks()
            .then_some(react_to_check_message as ResultFn);

        let reaction: Reaction = Box::new(
            move |state: &mut ProgressTracker, message: TrackerMessage| {
                if let Some(task_id) = entry(&app, state, &message) {
                    return progression(state, task_id);
                }
                match results {
                    Some(results) => results(state, message),
                    None => Vec::new(),
                }
            },
        );

        Self { mode, reaction }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// React to one message, returning the effects to carry out in order
    pub fn react(&self, state: &mut ProgressTracker, message: TrackerMessage) -> Vec<Effect> {
        (self.reaction)(state, message)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mode", &self.mode)
            .finish()
    }
}

fn entry_on_scheduler_running(
    app: &AppDefinition,
    _state: &ProgressTracker,
    message: &TrackerMessage,
) -> Option<TaskId> {
    match message {
        TrackerMessage::SchedulerStatus(update)
            if update.status.is_running() && app.is_target(&update.app_id, &update.version) =>
        {
            Some(update.task_id.clone())
        }
        _ => None,
    }
}

fn entry_on_health_alive(
    app: &AppDefinition,
    state: &ProgressTracker,
    message: &TrackerMessage,
) -> Option<TaskId> {
    match message {
        TrackerMessage::HealthStatus(change)
            if change.alive
                && app.is_target(&change.app_id, &change.version)
                && !state.is_healthy(&change.task_id) =>
        {
            Some(change.task_id.clone())
        }
        _ => None,
    }
}

fn react_to_check_message(state: &mut ProgressTracker, message: TrackerMessage) -> Vec<Effect> {
    match message {
        TrackerMessage::CheckResult(result) => state.record_check_result(result),
        TrackerMessage::BeginCheck(begin) => state.begin_check(begin),
        _ => Vec::new(),
    }
}
