//! # Application Definition
//!
//! The deployment target a tracker works for: app id, version, and the health
//! and readiness checks configured on it. The two flags the event dispatcher
//! is built from (`has_health_checks`, `has_readiness_checks`) are derived
//! from the check lists, and [`AppDefinition::readiness_check_specs`] is the
//! function that turns a launched task into concrete [`CheckSpec`]s.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

use super::identifiers::AppId;
use super::readiness_check::CheckSpec;
use super::task::{LaunchData, Task};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDefinition {
    pub id: AppId,
    pub version: String,
    /// Names of the app's port definitions, index-aligned with `LaunchData::host_ports`
    #[serde(default)]
    pub port_names: Vec<String>,
    #[serde(default)]
    pub health_checks: Vec<HealthCheckDefinition>,
    #[serde(default)]
    pub readiness_checks: Vec<ReadinessCheckDefinition>,
}

impl AppDefinition {
    pub fn new(id: impl Into<AppId>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            port_names: Vec::new(),
            health_checks: Vec::new(),
            readiness_checks: Vec::new(),
        }
    }

    pub fn with_port_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.port_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_health_check(mut self, check: HealthCheckDefinition) -> Self {
        self.health_checks.push(check);
        self
    }

    pub fn with_readiness_check(mut self, check: ReadinessCheckDefinition) -> Self {
        self.readiness_checks.push(check);
        self
    }

    pub fn has_health_checks(&self) -> bool {
        !self.health_checks.is_empty()
    }

    pub fn has_readiness_checks(&self) -> bool {
        !self.readiness_checks.is_empty()
    }

    /// Check whether an event's app id and version address this deployment target
    pub fn is_target(&self, app_id: &AppId, version: &str) -> bool {
        &self.id == app_id && self.version == version
    }

    /// Derive one [`CheckSpec`] per configured readiness check for a launched task
    ///
    /// A check whose `port_name` does not resolve to a host port is skipped;
    /// the remaining checks are still returned.
    pub fn readiness_check_specs(&self, task: &Task, launch_data: &LaunchData) -> Vec<CheckSpec> {
        self.readiness_checks
            .iter()
            .filter_map(|check| {
                let port = self
                    .port_names
                    .iter()
                    .position(|name| name == &check.port_name)
                    .and_then(|index| launch_data.host_port(index));

                let Some(port) = port else {
                    warn!(
                        app_id = %self.id,
                        task_id = %task.task_id,
                        check_name = %check.name,
                        port_name = %check.port_name,
                        "Readiness check port does not resolve to a host port, skipping check"
                    );
                    return None;
                };

                Some(CheckSpec {
                    task_id: task.task_id.clone(),
                    check_name: check.name.clone(),
                    url: format!(
                        "{}://{}:{}{}",
                        check.protocol, launch_data.host, port, check.path
                    ),
                    interval: Duration::from_millis(check.interval_ms),
                    timeout: Duration::from_millis(check.timeout_ms),
                    http_status_codes_for_ready: check.http_status_codes_for_ready.clone(),
                    preserve_last_response: check.preserve_last_response,
                })
            })
            .collect()
    }
}

/// Protocol a health check uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCheckProtocol {
    Http,
    Https,
    Tcp,
    Command,
}

/// Health check configured on an app
///
/// The tracker only cares whether any exist; execution belongs to the health
/// check subsystem, which reports back through `HealthStatusChanged` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckDefinition {
    pub protocol: HealthCheckProtocol,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub port_index: Option<usize>,
    #[serde(default = "default_grace_period_seconds")]
    pub grace_period_seconds: u64,
    #[serde(default = "default_health_interval_seconds")]
    pub interval_seconds: u64,
}

impl HealthCheckDefinition {
    pub fn http(path: impl Into<String>) -> Self {
        Self {
            protocol: HealthCheckProtocol::Http,
            path: Some(path.into()),
            port_index: Some(0),
            grace_period_seconds: default_grace_period_seconds(),
            interval_seconds: default_health_interval_seconds(),
        }
    }
}

fn default_grace_period_seconds() -> u64 {
    300
}

fn default_health_interval_seconds() -> u64 {
    60
}

/// Protocol a readiness check polls with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessCheckProtocol {
    #[default]
    Http,
    Https,
}

impl fmt::Display for ReadinessCheckProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// Readiness check configured on an app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessCheckDefinition {
    pub name: String,
    #[serde(default)]
    pub protocol: ReadinessCheckProtocol,
    #[serde(default = "default_readiness_path")]
    pub path: String,
    pub port_name: String,
    #[serde(default = "default_readiness_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_readiness_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_ready_status_codes")]
    pub http_status_codes_for_ready: Vec<u16>,
    #[serde(default)]
    pub preserve_last_response: bool,
}

impl ReadinessCheckDefinition {
    pub fn new(name: impl Into<String>, port_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            protocol: ReadinessCheckProtocol::default(),
            path: default_readiness_path(),
            port_name: port_name.into(),
            interval_ms: default_readiness_interval_ms(),
            timeout_ms: default_readiness_timeout_ms(),
            http_status_codes_for_ready: default_ready_status_codes(),
            preserve_last_response: false,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_protocol(mut self, protocol: ReadinessCheckProtocol) -> Self {
        self.protocol = protocol;
        self
    }
}

fn default_readiness_path() -> String {
    "/".to_string()
}

fn default_readiness_interval_ms() -> u64 {
    30_000
}

fn default_readiness_timeout_ms() -> u64 {
    10_000
}

fn default_ready_status_codes() -> Vec<u16> {
    vec![200]
}
