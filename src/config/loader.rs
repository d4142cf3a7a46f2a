//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles file discovery,
//! environment detection, and environment-variable overrides.

use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::ReadinessConfig;
use crate::error::Result;

/// Prefix for environment-variable overrides, e.g. `READINESS__TRACKER__EVENT_BUFFER_SIZE`
pub const ENV_PREFIX: &str = "READINESS";

pub struct ConfigManager {
    config: ReadinessConfig,
    environment: String,
}

impl ConfigManager {
    /// Load configuration from `config/` with environment auto-detection
    pub fn load() -> Result<Arc<ConfigManager>> {
        Self::load_from_directory(PathBuf::from("config"))
    }

    /// Load `readiness.toml` and `readiness.{environment}.toml` from a directory
    ///
    /// Both files are optional; missing keys fall back to defaults.
    pub fn load_from_directory(config_dir: impl AsRef<Path>) -> Result<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        let config_dir = config_dir.as_ref();
        let files = vec![
            config_dir.join("readiness.toml"),
            config_dir.join(format!("readiness.{environment}.toml")),
        ];

        Self::build(&files, ENV_PREFIX, environment)
    }

    /// Load a single configuration file plus environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Arc<ConfigManager>> {
        Self::load_from_file_with_env(path, ENV_PREFIX)
    }

    /// Load a single configuration file with an explicit environment-variable prefix
    ///
    /// This is useful for testing without colliding with the process-wide prefix.
    pub fn load_from_file_with_env(
        path: impl AsRef<Path>,
        env_prefix: &str,
    ) -> Result<Arc<ConfigManager>> {
        let files = vec![path.as_ref().to_path_buf()];
        Self::build(&files, env_prefix, Self::detect_environment())
    }

    fn build(
        files: &[PathBuf],
        env_prefix: &str,
        environment: String,
    ) -> Result<Arc<ConfigManager>> {
        let mut builder = Config::builder();
        for file in files {
            debug!(path = %file.display(), "Adding configuration source");
            builder = builder.add_source(File::from(file.as_path()).required(false));
        }

        let config: ReadinessConfig = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        debug!(
            environment = %environment,
            event_buffer_size = config.tracker.event_buffer_size,
            ready_hook_policy = ?config.tracker.ready_hook_policy,
            release_timeout_ms = config.tracker.release_timeout_ms,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Detect the current environment from environment variables
    pub fn detect_environment() -> String {
        env::var("READINESS_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }
}
