#![allow(clippy::doc_markdown)] // Allow technical terms like TaskId, DashMap in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Task Readiness
//!
//! Readiness determination for rolling deployments. A deployment step launches
//! task instances of an app; this crate correlates the scheduler status
//! stream, health-status changes and readiness-check results for those tasks
//! and decides, per task, when it is ready to serve traffic.
//!
//! ## Progression
//!
//! ```text
//! launched ──(running, or alive when health-checked)──► healthy ──► ready
//!                                                          │          ▲
//!                                                          └─ readiness checks (optional)
//! ```
//!
//! Which events move a task forward depends only on whether the app defines
//! health checks and readiness checks. When a task becomes ready the
//! embedding step's [`TaskReadyHook`] fires; every readiness-check result is
//! also forwarded to the [`DeploymentNotifier`].
//!
//! ## Module Organization
//!
//! - [`models`] - App definitions, tasks, check specs and results
//! - [`events`] - Inbound event shapes and lifecycle event publishing
//! - [`readiness`] - The per-plan tracker actor and its pure state machine
//! - [`registry`] - In-memory task tracker
//! - [`config`] - Configuration loading
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use task_readiness::config::TrackerConfig;
//! use task_readiness::events::SchedulerStatusUpdate;
//! use task_readiness::models::{AppDefinition, DeploymentPlanId, TaskId};
//! use task_readiness::readiness::{
//!     ReadinessCheckExecutor, ReadinessTracker, ReadyTaskCollector, TrackerCollaborators,
//! };
//! use task_readiness::registry::InMemoryTaskTracker;
//!
//! # async fn example(executor: Arc<dyn ReadinessCheckExecutor>) -> task_readiness::Result<()> {
//! let app = Arc::new(AppDefinition::new("/web", "v2"));
//! let collector = Arc::new(ReadyTaskCollector::new());
//! let (updates, _updates_rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! let handle = ReadinessTracker::new(
//!     DeploymentPlanId::new(),
//!     app,
//!     TrackerConfig::default(),
//!     TrackerCollaborators::new(
//!         Arc::new(InMemoryTaskTracker::new()),
//!         executor,
//!         Arc::new(updates),
//!         collector.clone(),
//!     ),
//! )
//! .start();
//!
//! handle
//!     .send(SchedulerStatusUpdate::running(TaskId::new("web.1"), "/web".into(), "v2"))
//!     .await?;
//! collector.wait_for(1).await;
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod readiness;
pub mod registry;

pub use crate::config::{ConfigManager, ReadinessConfig, ReadyHookPolicy, TrackerConfig};
pub use error::{ReadinessError, Result};
pub use events::{
    EventPublisher, HealthStatusChanged, InboundEvent, ReadinessCheckUpdate, ReadinessEvent,
    SchedulerStatusUpdate,
};
pub use models::{
    AppDefinition, AppId, CheckResult, CheckSpec, DeploymentPlanId, LaunchData, Task, TaskId,
};
pub use readiness::{
    DeploymentNotifier, ReadinessCheckExecutor, ReadinessTracker, ReadinessTrackerHandle,
    ReadyTaskCollector, TaskReadyHook, TaskTracker, TrackerCollaborators, TrackerSnapshot,
};
pub use registry::InMemoryTaskTracker;
