//! Configuration module for matchpulse-agent.
//!
//! Handles loading configuration from the TOML file and CLI overrides,
//! and validating it into runtime settings.

pub mod file;
pub mod runtime;

use crate::config::file::{FileConfig, PollingOverrides};
use crate::config::runtime::{
    ConnectivitySettings, LoadedConfig, NotificationSettings, SourceSettings,
};
use matchpulse_core::config::PollingConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    base_url_override: Option<Url>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, base_url_override: Option<Url>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            base_url_override,
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Read, override, and validate the configuration file.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn load_str(&self, content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(base_url) = &self.base_url_override {
            file_config.source.base_url = base_url.clone();
        }

        validate(&file_config)?;
        Ok(build_loaded_config(file_config))
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let url = &config.source.base_url;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "source.base_url must be http or https, got {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::ValidationError(
            "source.base_url has no host".to_string(),
        ));
    }

    let zero_secs = [
        ("source.timeout_secs", Some(config.source.timeout_secs)),
        ("polling.live", config.polling.live),
        ("polling.active", config.polling.active),
        ("polling.idle", config.polling.idle),
        ("polling.cooldown", config.polling.cooldown),
        ("connectivity.probe_interval_secs", Some(config.connectivity.probe_interval_secs)),
        ("connectivity.probe_timeout_secs", Some(config.connectivity.probe_timeout_secs)),
    ];
    for (name, value) in zero_secs {
        if value == Some(0) {
            return Err(ConfigError::ValidationError(format!("{name} must be at least 1")));
        }
    }
    if config.polling.max_consecutive_errors == Some(0) {
        return Err(ConfigError::ValidationError(
            "polling.max_consecutive_errors must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    LoadedConfig {
        source: SourceSettings {
            base_url: file_config.source.base_url,
            timeout: Duration::from_secs(file_config.source.timeout_secs),
            cache_ttl: Duration::from_secs(file_config.source.cache_ttl_secs),
        },
        polling: convert_polling(&file_config.polling),
        notifications: NotificationSettings {
            enabled: file_config.notifications.enabled,
            ledger_path: file_config.notifications.ledger_path,
        },
        followed_team_id: file_config.ambient.followed_team_id,
        connectivity: ConnectivitySettings {
            probe_interval: Duration::from_secs(file_config.connectivity.probe_interval_secs),
            probe_timeout: Duration::from_secs(file_config.connectivity.probe_timeout_secs),
        },
    }
}

fn convert_polling(overrides: &PollingOverrides) -> PollingConfig {
    let defaults = PollingConfig::default();
    let secs = |value: Option<u64>, default: Duration| value.map_or(default, Duration::from_secs);
    PollingConfig {
        live: secs(overrides.live, defaults.live),
        active: secs(overrides.active, defaults.active),
        idle: secs(overrides.idle, defaults.idle),
        cooldown: secs(overrides.cooldown, defaults.cooldown),
        inactivity_threshold: secs(overrides.inactivity_threshold, defaults.inactivity_threshold),
        max_consecutive_errors: overrides
            .max_consecutive_errors
            .unwrap_or(defaults.max_consecutive_errors),
    }
}
