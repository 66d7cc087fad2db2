//! Network reachability feeder.
//!
//! Periodically opens a TCP connection to the data endpoint's host and
//! reports changes in reachability to the application state.

use crate::config::runtime::ConnectivitySettings;
use matchpulse_core::state::{ConnectivitySignal, StateStore};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, info, warn};
use url::Url;

pub struct ConnectivityProbe {
    host: String,
    port: u16,
    settings: ConnectivitySettings,
}

impl ConnectivityProbe {
    /// Returns `None` if `base_url` has no host or known port.
    pub fn for_url(base_url: &Url, settings: ConnectivitySettings) -> Option<Self> {
        Some(Self {
            host: base_url.host_str()?.to_string(),
            port: base_url.port_or_known_default()?,
            settings,
        })
    }

    async fn is_reachable(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match timeout(self.settings.probe_timeout, connect).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(host = %self.host, error = %e, "Connectivity probe failed");
                false
            }
            Err(_) => {
                debug!(host = %self.host, "Connectivity probe timed out");
                false
            }
        }
    }

    pub fn spawn(self, state: Arc<StateStore>, mut shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                host = %self.host,
                port = self.port,
                interval_secs = self.settings.probe_interval.as_secs(),
                "Connectivity probe started"
            );
            let mut ticker = interval(self.settings.probe_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut reachable = None;

            loop {
                tokio::select! {
                    biased;

                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }

                    _ = ticker.tick() => {
                        let now = self.is_reachable().await;
                        if let Some(signal) = transition(reachable, now) {
                            log_transition(signal);
                            state.apply_connectivity(signal);
                        }
                        reachable = Some(now);
                    }
                }
            }
        })
    }
}

/// The signal implied by a reachability change, if any.
///
/// The first probe only reports a failure; the state starts online.
fn transition(previous: Option<bool>, now: bool) -> Option<ConnectivitySignal> {
    match (previous, now) {
        (Some(true) | None, false) => Some(ConnectivitySignal::Offline),
        (Some(false), true) => Some(ConnectivitySignal::Online),
        _ => None,
    }
}

fn log_transition(signal: ConnectivitySignal) {
    match signal {
        ConnectivitySignal::Offline => warn!("Data endpoint unreachable, going offline"),
        ConnectivitySignal::Online => info!("Data endpoint reachable again"),
    }
}
