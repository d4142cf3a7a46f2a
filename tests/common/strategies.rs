use proptest::prelude::*;

use task_readiness::events::TrackerMessage;
use task_readiness::models::{CheckResult, TaskId};

use super::{alive, not_alive, running};

pub const TASKS: [&str; 3] = ["web.1", "web.2", "web.3"];

/// Strategy for one inbound message addressed to one of [`TASKS`]
pub fn message_strategy() -> impl Strategy<Value = TrackerMessage> {
    let task = prop::sample::select(TASKS.to_vec());
    (task, 0u8..5).prop_map(|(task, kind)| match kind {
        0 => TrackerMessage::SchedulerStatus(running(task)),
        1 => TrackerMessage::HealthStatus(alive(task)),
        2 => TrackerMessage::HealthStatus(not_alive(task)),
        3 => TrackerMessage::CheckResult(CheckResult::new(TaskId::new(task), "ready", false)),
        _ => TrackerMessage::CheckResult(CheckResult::new(TaskId::new(task), "ready", true)),
    })
}

/// Strategy for interleaved message sequences across several tasks
pub fn interleaving_strategy() -> impl Strategy<Value = Vec<TrackerMessage>> {
    prop::collection::vec(message_strategy(), 0..40)
}

/// Strategy for the two app flags: (health checks, readiness checks)
pub fn app_flags_strategy() -> impl Strategy<Value = (bool, bool)> {
    (any::<bool>(), any::<bool>())
}
