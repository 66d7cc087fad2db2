//! TOML file configuration structures.
//!
//! These structs directly map to the `matchpulse.toml` file format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub polling: PollingOverrides,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub ambient: AmbientConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

/// Data endpoint section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Root URL of the site serving `/api/data` (e.g. "https://scores.example.com").
    pub base_url: Url,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How long a non-forced fetch may be served from the local cache.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_cache_ttl_secs() -> u64 {
    300
}

/// Optional overrides of the polling cadence, all in seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollingOverrides {
    pub live: Option<u64>,
    pub active: Option<u64>,
    pub idle: Option<u64>,
    pub cooldown: Option<u64>,
    pub inactivity_threshold: Option<u64>,
    pub max_consecutive_errors: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Whether finished matches are reported to `/api/sync-notify`.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Where already-reported match ids are persisted.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ledger_path: default_ledger_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("./matchpulse-notified.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientConfig {
    /// Team whose goals get the celebratory effect.
    #[serde(default = "default_followed_team_id")]
    pub followed_team_id: i64,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            followed_team_id: default_followed_team_id(),
        }
    }
}

fn default_followed_team_id() -> i64 {
    matchpulse_core::consumers::DEFAULT_FOLLOWED_TEAM_ID
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

fn default_probe_interval_secs() -> u64 {
    30
}

fn default_probe_timeout_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_str = r#"
[source]
base_url = "https://scores.example.com"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source.base_url.host_str(), Some("scores.example.com"));
        assert_eq!(config.source.timeout_secs, 15);
        assert_eq!(config.source.cache_ttl_secs, 300);
        assert!(config.polling.live.is_none());
        assert!(config.notifications.enabled);
        assert_eq!(
            config.notifications.ledger_path,
            PathBuf::from("./matchpulse-notified.json")
        );
        assert_eq!(config.ambient.followed_team_id, 81);
        assert_eq!(config.connectivity.probe_interval_secs, 30);
        assert_eq!(config.connectivity.probe_timeout_secs, 5);
    }

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[source]
base_url = "http://127.0.0.1:3000"
timeout_secs = 5
cache_ttl_secs = 60

[polling]
live = 30
cooldown = 900
max_consecutive_errors = 5

[notifications]
enabled = false
ledger_path = "/var/lib/matchpulse/notified.json"

[ambient]
followed_team_id = 86

[connectivity]
probe_interval_secs = 10
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source.base_url.port(), Some(3000));
        assert_eq!(config.polling.live, Some(30));
        assert_eq!(config.polling.idle, None);
        assert_eq!(config.polling.max_consecutive_errors, Some(5));
        assert!(!config.notifications.enabled);
        assert_eq!(config.ambient.followed_team_id, 86);
        assert_eq!(config.connectivity.probe_interval_secs, 10);
        assert_eq!(config.connectivity.probe_timeout_secs, 5);
    }

    #[test]
    fn test_missing_source_is_rejected() {
        assert!(toml::from_str::<FileConfig>("[ambient]\nfollowed_team_id = 1\n").is_err());
    }
}
