//! # Task Registry
//!
//! In-memory [`TaskTracker`] for embedding the readiness tracker without an
//! external scheduler, and for tests. Tasks are keyed by id in a concurrent
//! map so the step that launches tasks and the tracker's lookups never
//! contend on a single lock.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::models::{AppId, LaunchData, Task, TaskId};
use crate::readiness::TaskTracker;

#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskTracker {
    tasks: Arc<DashMap<TaskId, Task>>,
}

impl InMemoryTaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a task, returning the previous record
    pub fn upsert(&self, task: Task) -> Option<Task> {
        debug!(task_id = %task.task_id, launched = task.is_launched(), "Upserting task");
        self.tasks.insert(task.task_id.clone(), task)
    }

    /// Attach launch data to a known task; returns false for unknown tasks
    pub fn record_launch(&self, task_id: &TaskId, launch_data: LaunchData) -> bool {
        match self.tasks.get_mut(task_id) {
            Some(mut task) => {
                task.launch_data = Some(launch_data);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, task_id: &TaskId) -> Option<Task> {
        self.tasks.remove(task_id).map(|(_, task)| task)
    }

    pub fn get(&self, task_id: &TaskId) -> Option<Task> {
        self.tasks.get(task_id).map(|task| task.clone())
    }

    /// All tasks belonging to one app, in task id order
    pub fn tasks_for_app(&self, app_id: &AppId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|entry| &entry.app_id == app_id)
            .map(|entry| entry.value().clone())
            .collect();
        tasks.sort_by(|a, b| a.task_id.cmp(&b.task_id));
        tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[async_trait]
impl TaskTracker for InMemoryTaskTracker {
    async fn task(&self, task_id: &TaskId) -> Result<Option<Task>> {
        Ok(self.get(task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> Task {
        Task::new(TaskId::new(id), AppId::from("/web"), "v1")
    }

    #[tokio::test]
    async fn test_lookup_returns_launched_task() {
        let tracker = InMemoryTaskTracker::new();
        tracker.upsert(task("web.1"));
        assert!(tracker.record_launch(
            &TaskId::new("web.1"),
            LaunchData::new("agent-1", vec![31000])
        ));

        let found = tracker.task(&TaskId::new("web.1")).await.unwrap().unwrap();
        assert!(found.is_launched());
        assert_eq!(found.launch_data.unwrap().host_port(0), Some(31000));
    }

    #[tokio::test]
    async fn test_unknown_task_is_none() {
        let tracker = InMemoryTaskTracker::new();
        assert!(!tracker.record_launch(&TaskId::new("web.9"), LaunchData::new("agent-1", vec![])));
        assert_eq!(tracker.task(&TaskId::new("web.9")).await.unwrap(), None);
    }

    #[test]
    fn test_tasks_for_app_filters_and_sorts() {
        let tracker = InMemoryTaskTracker::new();
        tracker.upsert(task("web.2"));
        tracker.upsert(task("web.1"));
        tracker.upsert(Task::new(TaskId::new("api.1"), AppId::from("/api"), "v1"));

        let ids: Vec<TaskId> = tracker
            .tasks_for_app(&AppId::from("/web"))
            .into_iter()
            .map(|task| task.task_id)
            .collect();
        assert_eq!(ids, vec![TaskId::new("web.1"), TaskId::new("web.2")]);

        assert!(tracker.remove(&TaskId::new("api.1")).is_some());
        assert_eq!(tracker.len(), 2);
    }
}
