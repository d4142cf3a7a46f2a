//! Ordering independence: one task's messages never influence another task's
//! progression, however they are interleaved.

mod common;

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use common::*;
use task_readiness::config::ReadyHookPolicy;
use task_readiness::events::TrackerMessage;
use task_readiness::models::TaskId;
use task_readiness::readiness::{Dispatcher, Effect, ProgressTracker, TaskReadinessState};

fn dispatcher(health: bool, readiness: bool) -> Dispatcher {
    let checks: &[&str] = if readiness { &["ready"] } else { &[] };
    Dispatcher::new(Arc::new(app(health, checks)))
}

/// Apply messages and return each task's final state and hook count
fn run(
    dispatcher: &Dispatcher,
    policy: ReadyHookPolicy,
    messages: &[TrackerMessage],
) -> HashMap<TaskId, (TaskReadinessState, usize)> {
    let mut state = ProgressTracker::new(policy);
    let mut hooks: HashMap<TaskId, usize> = HashMap::new();
    for message in messages {
        for effect in dispatcher.react(&mut state, message.clone()) {
            if let Effect::FireReadyHook(task_id) = effect {
                *hooks.entry(task_id).or_default() += 1;
            }
        }
    }
    TASKS
        .iter()
        .map(|task| {
            let task_id = TaskId::new(*task);
            let hook_count = hooks.get(&task_id).copied().unwrap_or_default();
            (task_id.clone(), (state.state_of(&task_id), hook_count))
        })
        .collect()
}

proptest! {
    #[test]
    fn interleaving_matches_per_task_replay(
        (health, readiness) in app_flags_strategy(),
        every_event in any::<bool>(),
        messages in interleaving_strategy(),
    ) {
        let policy = if every_event {
            ReadyHookPolicy::EveryQualifyingEvent
        } else {
            ReadyHookPolicy::OncePerTask
        };
        let dispatcher = dispatcher(health, readiness);
        let interleaved = run(&dispatcher, policy, &messages);

        for task in TASKS {
            let task_id = TaskId::new(task);
            let own: Vec<TrackerMessage> = messages
                .iter()
                .filter(|message| message.task_id() == &task_id)
                .cloned()
                .collect();
            let isolated = run(&dispatcher, policy, &own);
            prop_assert_eq!(interleaved[&task_id], isolated[&task_id]);
        }
    }

    #[test]
    fn progression_is_monotonic(
        (health, readiness) in app_flags_strategy(),
        messages in interleaving_strategy(),
    ) {
        let dispatcher = dispatcher(health, readiness);
        let mut state = ProgressTracker::default();
        let mut previous: HashMap<TaskId, TaskReadinessState> = HashMap::new();

        for message in messages {
            let task_id = message.task_id().clone();
            dispatcher.react(&mut state, message);
            let current = state.state_of(&task_id);
            if let Some(before) = previous.get(&task_id) {
                prop_assert!(rank(*before) <= rank(current));
            }
            previous.insert(task_id, current);
        }
    }
}

fn rank(state: TaskReadinessState) -> u8 {
    match state {
        TaskReadinessState::Launched => 0,
        TaskReadinessState::Healthy => 1,
        TaskReadinessState::Ready => 2,
    }
}

#[tokio::test]
async fn test_health_event_order_relative_to_other_task_is_irrelevant() {
    let before = Harness::start(app(true, &[]), Arc::new(CountingTaskTracker::new()));
    before.handle.send(alive("web.1")).await.unwrap();
    before.handle.send(running("web.2")).await.unwrap();

    let after = Harness::start(app(true, &[]), Arc::new(CountingTaskTracker::new()));
    after.handle.send(running("web.2")).await.unwrap();
    after.handle.send(alive("web.1")).await.unwrap();

    let before = before.handle.stop().await.unwrap();
    let after = after.handle.stop().await.unwrap();
    assert_eq!(before.healthy, after.healthy);
    assert_eq!(before.ready, after.ready);
    assert!(before.is_ready(&TaskId::new("web.1")));
    assert!(!before.is_healthy(&TaskId::new("web.2")));
}
