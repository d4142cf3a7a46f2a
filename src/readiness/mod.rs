//! # Task Readiness
//!
//! Decides when each task launched by a deployment step is ready to serve
//! traffic and notifies the step and the deployment coordinator.
//!
//! - [`progress`]: pure state transitions over the `healthy` and `ready` sets
//! - [`dispatcher`]: the reaction function chosen by the app's health and
//!   readiness check configuration
//! - [`scheduler`]: task lookup and readiness-check stream startup
//! - [`subscriptions`]: open check streams keyed by task and check name
//! - [`tracker`]: the actor that owns all of the above behind one queue

pub mod channels;
pub mod commands;
pub mod dispatcher;
pub mod hooks;
pub mod progress;
pub mod scheduler;
pub mod subscriptions;
pub mod tracker;

pub use channels::{
    ChannelFactory, TrackerCommandReceiver, TrackerCommandSender, WeakTrackerCommandSender,
};
pub use commands::{TrackerCommand, TrackerSnapshot};
pub use dispatcher::{DispatchMode, Dispatcher};
pub use hooks::{DeploymentNotifier, ReadyTaskCollector, TaskReadyHook};
pub use progress::{Effect, ProgressTracker, TaskReadinessState};
pub use scheduler::{CheckScheduler, ReadinessCheckExecutor, TaskTracker};
pub use subscriptions::{SubscriptionHandle, SubscriptionRegistry};
pub use tracker::{ReadinessTracker, ReadinessTrackerHandle, TrackerCollaborators};
