//! # Readiness Tracker Configuration
//!
//! Layered configuration for readiness trackers: optional TOML files per
//! environment, overridden by `READINESS__`-prefixed environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use task_readiness::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//!
//! let buffer = manager.config().tracker.event_buffer_size;
//! let policy = manager.config().tracker.ready_hook_policy;
//! # Ok(())
//! # }
//! ```

pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ReadinessError, Result};

pub use loader::ConfigManager;

/// Root configuration structure mirroring `config/readiness.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub tracker: TrackerConfig,
    pub logging: LoggingConfig,
    pub events: EventsConfig,
}

impl ReadinessConfig {
    /// Reject values the tracker cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tracker.event_buffer_size == 0 {
            return Err(ReadinessError::Configuration(
                "tracker.event_buffer_size must be greater than zero".to_string(),
            ));
        }
        if self.tracker.release_timeout_ms == 0 {
            return Err(ReadinessError::Configuration(
                "tracker.release_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.events.capacity == 0 {
            return Err(ReadinessError::Configuration(
                "events.capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for one readiness tracker instance
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Capacity of the tracker's inbound queue
    pub event_buffer_size: usize,
    pub ready_hook_policy: ReadyHookPolicy,
    /// How long `stop` waits for a released check stream to wind down before aborting it
    pub release_timeout_ms: u64,
}

impl TrackerConfig {
    pub fn release_timeout(&self) -> Duration {
        Duration::from_millis(self.release_timeout_ms)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 1024,
            ready_hook_policy: ReadyHookPolicy::default(),
            release_timeout_ms: 5000,
        }
    }
}

/// When the "task is ready" hook fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyHookPolicy {
    /// Fire only when a task first enters the ready set
    #[default]
    OncePerTask,
    /// Fire on every qualifying event: each duplicate "running" update on the
    /// direct path and each check result reporting ready
    EveryQualifyingEvent,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Explicit filter directive; the environment default applies when unset
    pub level: Option<String>,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast capacity of the lifecycle event publisher
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}
