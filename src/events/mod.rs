//! # Readiness Events
//!
//! Inbound event shapes consumed by a tracker and the lifecycle events it
//! publishes for observers.

pub mod publisher;
pub mod types;

pub use publisher::{EventPublisher, PublishedEvent};
pub use types::{
    BeginCheck, HealthStatusChanged, InboundEvent, ReadinessCheckUpdate, ReadinessEvent,
    SchedulerStatusUpdate, TrackerMessage,
};
