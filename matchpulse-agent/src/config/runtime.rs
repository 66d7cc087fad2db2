//! Validated runtime configuration.
//!
//! Built from the TOML [`FileConfig`](super::file::FileConfig) by
//! [`ConfigLoader`](super::ConfigLoader); durations are resolved and
//! defaults applied.

use matchpulse_core::config::PollingConfig;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub source: SourceSettings,
    pub polling: PollingConfig,
    pub notifications: NotificationSettings,
    pub followed_team_id: i64,
    pub connectivity: ConnectivitySettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    pub base_url: Url,
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub ledger_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivitySettings {
    pub probe_interval: Duration,
    pub probe_timeout: Duration,
}
