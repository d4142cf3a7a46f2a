//! # Lifecycle Event Publisher
//!
//! Broadcasts what a tracker did (task healthy, checks scheduled, task ready,
//! subscription released, tracker stopped) to any number of observers.
//! Observers that fall behind lose the oldest events.
//!
//! ## Usage
//!
//! ```rust
//! use task_readiness::events::{EventPublisher, ReadinessEvent};
//! use task_readiness::models::{DeploymentPlanId, TaskId};
//!
//! # tokio_test::block_on(async {
//! let publisher = EventPublisher::new(16);
//! let mut events = publisher.subscribe();
//!
//! publisher.publish(ReadinessEvent::TaskReady {
//!     plan_id: DeploymentPlanId::new(),
//!     task_id: TaskId::new("web.1"),
//! });
//!
//! let published = events.recv().await.unwrap();
//! assert_eq!(published.name, "readiness.task_ready");
//! # });
//! ```

use tokio::sync::broadcast;

use super::types::ReadinessEvent;
use crate::config::EventsConfig;

/// Broadcast publisher for readiness lifecycle events
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

/// Event that has been published
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub name: &'static str,
    pub event: ReadinessEvent,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn from_config(config: &EventsConfig) -> Self {
        Self::new(config.capacity)
    }

    /// Publish a lifecycle event
    ///
    /// Publishing with no subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: ReadinessEvent) {
        let published = PublishedEvent {
            name: event.event_name(),
            event,
            published_at: chrono::Utc::now(),
        };

        if self.sender.send(published).is_err() {
            tracing::trace!("No subscribers for readiness event");
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::from_config(&EventsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeploymentPlanId, TaskId};

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let publisher = EventPublisher::new(8);
        assert_eq!(publisher.subscriber_count(), 0);

        publisher.publish(ReadinessEvent::TaskHealthy {
            plan_id: DeploymentPlanId::new(),
            task_id: TaskId::new("web.1"),
        });
    }

    #[tokio::test]
    async fn test_subscriber_receives_named_event() {
        let publisher = EventPublisher::new(8);
        let mut receiver = publisher.subscribe();

        publisher.publish(ReadinessEvent::TaskReady {
            plan_id: DeploymentPlanId::new(),
            task_id: TaskId::new("web.1"),
        });

        let published = receiver.recv().await.unwrap();
        assert_eq!(published.name, "readiness.task_ready");
        assert!(matches!(published.event, ReadinessEvent::TaskReady { .. }));
    }

    #[test]
    fn test_every_subscriber_sees_each_event_in_order() {
        let publisher = EventPublisher::default();
        let mut first = publisher.subscribe();
        let mut second = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 2);

        let plan_id = DeploymentPlanId::new();
        publisher.publish(ReadinessEvent::TaskHealthy {
            plan_id,
            task_id: TaskId::new("web.1"),
        });
        publisher.publish(ReadinessEvent::TaskReady {
            plan_id,
            task_id: TaskId::new("web.1"),
        });

        tokio_test::block_on(async {
            for receiver in [&mut first, &mut second] {
                let healthy = tokio_test::assert_ok!(receiver.recv().await);
                let ready = tokio_test::assert_ok!(receiver.recv().await);
                assert_eq!(healthy.name, "readiness.task_healthy");
                assert_eq!(ready.name, "readiness.task_ready");
            }
        });
    }
}
