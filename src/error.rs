//! Error types for the readiness tracker.

use thiserror::Error;

use crate::models::TaskId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadinessError {
    #[error("Task lookup error: {0}")]
    TaskLookup(String),
    #[error("Duplicate readiness check subscription for task {task_id} check '{check_name}'")]
    DuplicateSubscription { task_id: TaskId, check_name: String },
    #[error("Readiness tracker has stopped")]
    TrackerStopped,
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ReadinessError {
    fn from(error: serde_json::Error) -> Self {
        ReadinessError::Serialization(format!("JSON serialization error: {error}"))
    }
}

impl From<config::ConfigError> for ReadinessError {
    fn from(error: config::ConfigError) -> Self {
        ReadinessError::Configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReadinessError>;
