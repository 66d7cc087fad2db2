use crate::config::PollingConfig;
use crate::state::ApplicationState;
use std::fmt;
use std::time::Duration;

/// Polling cadence tier, derived fresh for every scheduling decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingMode {
    Live,
    Active,
    Idle,
    Cooldown,
}

impl OperatingMode {
    pub fn interval(self, config: &PollingConfig) -> Duration {
        match self {
            OperatingMode::Live => config.live,
            OperatingMode::Active => config.active,
            OperatingMode::Idle => config.idle,
            OperatingMode::Cooldown => config.cooldown,
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperatingMode::Live => "live",
            OperatingMode::Active => "active",
            OperatingMode::Idle => "idle",
            OperatingMode::Cooldown => "cooldown",
        };
        f.write_str(name)
    }
}

/// Returns the polling mode for the next cycle.
///
/// Priority: error cooldown, then a live match, then recent user activity.
pub fn select_mode(
    state: ApplicationState,
    since_last_activity: Duration,
    consecutive_errors: u32,
    config: &PollingConfig,
) -> OperatingMode {
    if consecutive_errors >= config.max_consecutive_errors {
        return OperatingMode::Cooldown;
    }
    if state == ApplicationState::Live {
        return OperatingMode::Live;
    }
    match since_last_activity {
        d if d < config.inactivity_threshold => OperatingMode::Active,
        _ => OperatingMode::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_mode_priority() {
        let config = PollingConfig::default();

        assert_eq!(
            select_mode(ApplicationState::Live, secs(0), 3, &config),
            OperatingMode::Cooldown
        );
        assert_eq!(
            select_mode(ApplicationState::Live, secs(900), 2, &config),
            OperatingMode::Live
        );
        assert_eq!(
            select_mode(ApplicationState::Idle, secs(119), 0, &config),
            OperatingMode::Active
        );
        assert_eq!(
            select_mode(ApplicationState::Idle, secs(120), 0, &config),
            OperatingMode::Idle
        );
        assert_eq!(
            select_mode(ApplicationState::Offline, secs(5), 0, &config),
            OperatingMode::Active
        );
    }

    #[test]
    fn test_default_intervals() {
        let config = PollingConfig::default();
        assert_eq!(OperatingMode::Live.interval(&config), secs(60));
        assert_eq!(OperatingMode::Active.interval(&config), secs(120));
        assert_eq!(OperatingMode::Idle.interval(&config), secs(300));
        assert_eq!(OperatingMode::Cooldown.interval(&config), secs(600));
    }
}
