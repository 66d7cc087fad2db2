//! AdaptivePoller processor.
//!
//! The AdaptivePoller is responsible for:
//! - Fetching a fresh `Snapshot` from its `SnapshotSource` on a one-shot
//!   schedule that is re-armed after every cycle
//! - Choosing the next interval from the operating mode (see
//!   [`select_mode`]) and the poll outcome
//! - Forwarding successful snapshots to subscribers
//! - Polling immediately when a user returns after a period of inactivity
//!
//! At most one fetch is in flight at a time. Timer-driven, activity-driven
//! and explicitly requested polls all go through the same guard.

use crate::config::{ConfigStore, ConfigWatcher, PollingConfig};
use crate::source::{FetchMode, SnapshotSource};
use crate::state::{ApplicationState, StateStore};
use crate::utils::isolate::run_isolated;
use crate::utils::polling_interval::{OperatingMode, select_mode};
use matchpulse_sdk::objects::Snapshot;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

/// User interaction kinds that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySignal {
    PointerMove,
    KeyPress,
    Scroll,
    Click,
}

pub type SnapshotSubscriber = Arc<dyn Fn(&Snapshot) -> anyhow::Result<()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleDecision {
    pub mode: OperatingMode,
    pub interval: Duration,
    /// Consecutive failure count after this cycle.
    pub consecutive_errors: u32,
}

pub struct AdaptivePoller<S> {
    source: S,
    state: Arc<StateStore>,
    config: ConfigStore<PollingConfig>,
    last_activity: Mutex<Instant>,
    consecutive_errors: AtomicU32,
    in_flight: AtomicBool,
    subscribers: RwLock<Vec<(SubscriberId, SnapshotSubscriber)>>,
    next_subscriber_id: AtomicU64,
    /// When the next timer-driven poll is due, and the decision behind it.
    schedule: Mutex<Schedule>,
    /// Asks the run loop for an immediate poll.
    wake: Notify,
    /// Tells the run loop that `schedule` changed.
    rescheduled: Notify,
}

#[derive(Debug, Clone, Copy)]
struct Schedule {
    due: Instant,
    last: Option<(Instant, OperatingMode)>,
}

/// Clears the in-flight flag however the cycle ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: SnapshotSource> AdaptivePoller<S> {
    pub fn new(source: S, state: Arc<StateStore>, config: ConfigStore<PollingConfig>) -> Self {
        let now = Instant::now();
        Self {
            source,
            state,
            config,
            last_activity: Mutex::new(now),
            consecutive_errors: AtomicU32::new(0),
            in_flight: AtomicBool::new(false),
            subscribers: RwLock::new(Vec::new()),
            next_subscriber_id: AtomicU64::new(0),
            schedule: Mutex::new(Schedule {
                due: now,
                last: None,
            }),
            wake: Notify::new(),
            rescheduled: Notify::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors.load(Ordering::Acquire)
    }

    pub fn is_polling(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// When the next timer-driven poll is due.
    pub fn next_due(&self) -> Instant {
        self.schedule.lock().due
    }

    /// Register a callback invoked with every successfully fetched snapshot.
    pub fn subscribe(
        &self,
        subscriber: impl Fn(&Snapshot) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, Arc::new(subscriber)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Record a user interaction.
    ///
    /// Returns `true` when the interaction ended a period of inactivity and
    /// an immediate poll was requested. No poll is requested while a match
    /// is live (the live cadence already applies) or while a fetch is in
    /// flight.
    pub async fn record_activity(&self, signal: ActivitySignal) -> bool {
        let threshold = self.config.read().await.inactivity_threshold;
        let now = Instant::now();
        let previous = std::mem::replace(&mut *self.last_activity.lock(), now);
        let was_inactive = now.saturating_duration_since(previous) >= threshold;

        if was_inactive && !self.is_polling() && !self.state.is_live() {
            debug!(?signal, "User returned after inactivity, polling now");
            self.wake.notify_one();
            return true;
        }
        false
    }

    /// Ask the run loop for an out-of-schedule poll.
    ///
    /// Ignored while a fetch is already in flight.
    pub fn request_poll(&self) -> bool {
        if self.is_polling() {
            return false;
        }
        self.wake.notify_one();
        true
    }

    /// Run one poll cycle and store the resulting schedule.
    ///
    /// Returns `None` without fetching if another cycle is in flight.
    pub async fn poll_once(&self) -> Option<ScheduleDecision> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("Poll already in flight, skipping");
            return None;
        };

        let result = self.source.fetch(FetchMode::Force).await;
        let config = self.config.snapshot().await;

        let mode = match result {
            Ok(snapshot) => {
                self.consecutive_errors.store(0, Ordering::Release);
                self.notify_subscribers(&snapshot);
                let since_activity = self.last_activity.lock().elapsed();
                select_mode(self.state.get(), since_activity, 0, &config)
            }
            Err(e) if e.is_rate_limited() => {
                warn!(error = %e, "Snapshot source rate limited, backing off");
                OperatingMode::Idle
            }
            Err(e) => {
                let errors = self.consecutive_errors.fetch_add(1, Ordering::AcqRel) + 1;
                warn!(error = %e, consecutive_errors = errors, "Snapshot fetch failed");
                if errors >= config.max_consecutive_errors {
                    OperatingMode::Cooldown
                } else {
                    OperatingMode::Active
                }
            }
        };

        if mode == OperatingMode::Cooldown {
            self.state.set(ApplicationState::Error);
        }

        let interval = mode.interval(&config);
        let now = Instant::now();
        *self.schedule.lock() = Schedule {
            due: now + interval,
            last: Some((now, mode)),
        };
        self.rescheduled.notify_one();

        let decision = ScheduleDecision {
            mode,
            interval,
            consecutive_errors: self.consecutive_errors(),
        };
        debug!(
            mode = %decision.mode,
            interval_secs = decision.interval.as_secs(),
            "Scheduled next poll"
        );
        Some(decision)
    }

    /// Run the poller until shutdown is signaled.
    ///
    /// The first poll happens immediately. A config reload re-arms the
    /// pending timer with the new interval for the last selected mode.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>, mut config_watcher: ConfigWatcher) {
        info!("AdaptivePoller started");

        loop {
            let due = self.next_due();
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("AdaptivePoller received shutdown signal");
                        break;
                    }
                }

                Ok(()) = config_watcher.changed() => {
                    let config = self.config.snapshot().await;
                    let mut schedule = self.schedule.lock();
                    if let Some((at, mode)) = schedule.last {
                        schedule.due = at + mode.interval(&config);
                        info!(mode = %mode, "Polling config reloaded, timer re-armed");
                    }
                }

                _ = self.wake.notified() => {
                    self.poll_once().await;
                }

                // Another caller finished a cycle; pick up its deadline.
                _ = self.rescheduled.notified() => {}

                _ = sleep_until(due) => {
                    if self.poll_once().await.is_none() {
                        // Lost the race to another caller, who will reschedule.
                        self.rescheduled.notified().await;
                    }
                }
            }
        }

        info!("AdaptivePoller shutdown complete");
    }

    fn notify_subscribers(&self, snapshot: &Snapshot) {
        let subscribers: Vec<SnapshotSubscriber> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect();
        for subscriber in subscribers {
            run_isolated("poller", "subscriber", || subscriber(snapshot));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use crate::test_support::{MatchBuilder, ScriptedSource};
    use async_trait::async_trait;
    use matchpulse_sdk::objects::MatchStatus;

    fn poller(source: ScriptedSource) -> AdaptivePoller<ScriptedSource> {
        AdaptivePoller::new(
            source,
            Arc::new(StateStore::default()),
            ConfigStore::new(PollingConfig::default()),
        )
    }

    fn transport() -> SourceError {
        SourceError::Transport("connection reset".into())
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_failures_enter_cooldown_until_success() {
        let source = ScriptedSource::new();
        for _ in 0..4 {
            source.push_err(transport());
        }
        source.push_ok(vec![]);
        let poller = poller(source);

        let mut modes = Vec::new();
        for _ in 0..4 {
            modes.push(poller.poll_once().await.unwrap().mode);
        }
        assert_eq!(
            modes,
            vec![
                OperatingMode::Active,
                OperatingMode::Active,
                OperatingMode::Cooldown,
                OperatingMode::Cooldown,
            ]
        );
        assert_eq!(poller.consecutive_errors(), 4);
        assert_eq!(poller.state.get(), ApplicationState::Error);

        let decision = poller.poll_once().await.unwrap();
        assert_eq!(decision.consecutive_errors, 0);
        assert_eq!(decision.mode, OperatingMode::Active);
        assert_eq!(decision.interval, Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_does_not_count_as_failure() {
        let source = ScriptedSource::new();
        source.push_err(SourceError::RateLimited);
        source.push_err(transport());
        let poller = poller(source);

        let decision = poller.poll_once().await.unwrap();
        assert_eq!(decision.mode, OperatingMode::Idle);
        assert_eq!(decision.interval, Duration::from_secs(300));
        assert_eq!(decision.consecutive_errors, 0);

        let decision = poller.poll_once().await.unwrap();
        assert_eq!(decision.consecutive_errors, 1);
        assert_eq!(decision.mode, OperatingMode::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_mode_follows_state_and_activity() {
        let source = ScriptedSource::new();
        source.push_ok(vec![]);
        source.push_ok(vec![MatchBuilder::new(1).status(MatchStatus::InPlay).build()]);
        let poller = poller(source);
        let state = Arc::clone(&poller.state);
        poller.subscribe(move |snapshot| {
            state.set(if snapshot.has_live_match() {
                ApplicationState::Live
            } else {
                ApplicationState::Idle
            });
            Ok(())
        });

        tokio::time::advance(Duration::from_secs(121)).await;
        assert_eq!(poller.poll_once().await.unwrap().mode, OperatingMode::Idle);
        assert_eq!(poller.poll_once().await.unwrap().mode, OperatingMode::Live);
        assert_eq!(poller.source().modes(), vec![FetchMode::Force, FetchMode::Force]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_subscriber_does_not_fail_the_cycle() {
        let source = ScriptedSource::new();
        source.push_ok(vec![]);
        let poller = poller(source);
        poller.subscribe(|_| Err(anyhow::anyhow!("subscriber failed")));
        let seen = Arc::new(AtomicU32::new(0));
        let s = Arc::clone(&seen);
        let id = poller.subscribe(move |_| {
            s.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });

        let decision = poller.poll_once().await.unwrap();
        assert_eq!(decision.consecutive_errors, 0);
        assert_eq!(seen.load(Ordering::Relaxed), 1);
        assert!(poller.unsubscribe(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_after_inactivity_requests_poll() {
        let poller = poller(ScriptedSource::new());

        assert!(!poller.record_activity(ActivitySignal::Click).await);
        tokio::time::advance(Duration::from_secs(120)).await;
        assert!(poller.record_activity(ActivitySignal::PointerMove).await);
        assert!(!poller.record_activity(ActivitySignal::Scroll).await);

        poller.state.set(ApplicationState::Live);
        tokio::time::advance(Duration::from_secs(600)).await;
        assert!(!poller.record_activity(ActivitySignal::KeyPress).await);
    }

    /// A source that blocks until released.
    struct GatedSource {
        gate: Notify,
    }

    #[async_trait]
    impl SnapshotSource for GatedSource {
        async fn fetch(&self, _mode: FetchMode) -> Result<Snapshot, SourceError> {
            self.gate.notified().await;
            Ok(Snapshot::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_polls_are_skipped() {
        let poller = Arc::new(AdaptivePoller::new(
            GatedSource { gate: Notify::new() },
            Arc::new(StateStore::default()),
            ConfigStore::new(PollingConfig::default()),
        ));

        let first = tokio::spawn({
            let poller = Arc::clone(&poller);
            async move { poller.poll_once().await }
        });
        while !poller.is_polling() {
            tokio::task::yield_now().await;
        }

        assert!(poller.poll_once().await.is_none());
        assert!(!poller.request_poll());
        tokio::time::advance(Duration::from_secs(300)).await;
        assert!(!poller.record_activity(ActivitySignal::Click).await);

        poller.source().gate.notify_one();
        assert!(first.await.unwrap().is_some());
        assert!(!poller.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_immediately_then_on_wake_until_shutdown() {
        let source = ScriptedSource::new();
        source.push_ok(vec![]);
        source.push_ok(vec![]);
        let poller = Arc::new(poller(source));
        let config = poller.config.clone();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn({
            let poller = Arc::clone(&poller);
            let watcher = config.subscribe();
            async move { poller.run(shutdown_rx, watcher).await }
        });

        while poller.source().calls() < 1 {
            tokio::task::yield_now().await;
        }
        let due = poller.next_due();

        assert!(poller.request_poll());
        while poller.source().calls() < 2 {
            tokio::task::yield_now().await;
        }
        assert!(poller.next_due() >= due);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
        assert_eq!(poller.source().calls(), 2);
    }

    fn spawn_run(
        poller: &Arc<AdaptivePoller<ScriptedSource>>,
    ) -> (watch::Sender<bool>, tokio::task::JoinHandle<()>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn({
            let poller = Arc::clone(poller);
            let watcher = poller.config.subscribe();
            async move { poller.run(shutdown_rx, watcher).await }
        });
        (shutdown_tx, handle)
    }

    /// Wait until `calls` cycles have fetched and the last one has finished.
    async fn wait_for_calls(poller: &AdaptivePoller<ScriptedSource>, calls: usize) {
        while poller.source().calls() < calls || poller.is_polling() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_again_when_interval_elapses() {
        let source = ScriptedSource::new();
        source.push_ok(vec![]);
        source.push_ok(vec![]);
        let poller = Arc::new(poller(source));
        let start = Instant::now();
        let (shutdown_tx, handle) = spawn_run(&poller);

        wait_for_calls(&poller, 1).await;
        assert_eq!(poller.next_due(), start + Duration::from_secs(120));

        tokio::time::sleep(Duration::from_secs(119)).await;
        assert_eq!(poller.source().calls(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(poller.source().calls(), 2);
        // No interaction for 120s, so the next cycle uses the idle cadence.
        assert_eq!(poller.next_due(), start + Duration::from_secs(420));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_config_reload_rearms_pending_timer() {
        let source = ScriptedSource::new();
        source.push_ok(vec![]);
        source.push_ok(vec![]);
        let poller = Arc::new(poller(source));
        let start = Instant::now();
        let (shutdown_tx, handle) = spawn_run(&poller);

        wait_for_calls(&poller, 1).await;
        assert_eq!(poller.next_due(), start + Duration::from_secs(120));

        poller
            .config
            .update(PollingConfig {
                active: Duration::from_secs(10),
                ..PollingConfig::default()
            })
            .await;
        while poller.next_due() != start + Duration::from_secs(10) {
            tokio::task::yield_now().await;
        }

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(poller.source().calls(), 2);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_return_from_inactivity() {
        let source = ScriptedSource::new();
        source.push_ok(vec![]);
        source.push_ok(vec![]);
        let poller = Arc::new(AdaptivePoller::new(
            source,
            Arc::new(StateStore::default()),
            ConfigStore::new(PollingConfig {
                inactivity_threshold: Duration::from_secs(30),
                ..PollingConfig::default()
            }),
        ));
        let start = Instant::now();
        let (shutdown_tx, handle) = spawn_run(&poller);

        wait_for_calls(&poller, 1).await;
        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(poller.source().calls(), 1);

        assert!(poller.record_activity(ActivitySignal::KeyPress).await);
        wait_for_calls(&poller, 2).await;
        assert_eq!(Instant::now(), start + Duration::from_secs(31));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
