//! # Data Model
//!
//! Identifiers, the deployment target definition, the task-tracker view of a
//! task, and the readiness check types exchanged with the check executor.

pub mod app_definition;
pub mod identifiers;
pub mod readiness_check;
pub mod task;

pub use app_definition::{
    AppDefinition, HealthCheckDefinition, HealthCheckProtocol, ReadinessCheckDefinition,
    ReadinessCheckProtocol,
};
pub use identifiers::{AppId, DeploymentPlanId, TaskId};
pub use readiness_check::{CheckResult, CheckSpec, HttpResponse, SubscriptionKey};
pub use task::{LaunchData, Task};
