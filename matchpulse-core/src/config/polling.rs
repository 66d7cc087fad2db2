//! Polling cadence configuration.

use std::time::Duration;

/// Intervals and thresholds driving the adaptive poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingConfig {
    /// Cadence while a match is live, regardless of user activity.
    pub live: Duration,
    /// Cadence while the user interacted recently, and after a transient failure.
    pub active: Duration,
    /// Cadence with no recent interaction, and after a rate-limit response.
    pub idle: Duration,
    /// Cadence after too many consecutive failures.
    pub cooldown: Duration,
    /// How long after the last interaction the user counts as inactive.
    pub inactivity_threshold: Duration,
    /// Consecutive failures that put the poller into cooldown.
    pub max_consecutive_errors: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            live: Duration::from_secs(60),
            active: Duration::from_secs(120),
            idle: Duration::from_secs(300),
            cooldown: Duration::from_secs(600),
            inactivity_threshold: Duration::from_secs(120),
            max_consecutive_errors: 3,
        }
    }
}
