//! Composition root of the live-data refresh pipeline.
//!
//! `LivePipeline` constructs the single instance of every pipeline
//! component and wires them together. Collaborators receive handles from
//! it; nothing is looked up globally.

use crate::config::{ConfigStore, PollingConfig};
use crate::detectors::{MatchEndWatcher, MatchEventsDetector};
use crate::events::{Event, EventBus, MatchEndNoticeSender};
use crate::ledger::NotificationLedger;
use crate::processors::{AdaptivePoller, ChangeDetector};
use crate::source::SnapshotSource;
use crate::state::{ApplicationState, StateStore};
use crate::utils::relevance::select_relevant;
use matchpulse_sdk::objects::Snapshot;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::debug;

/// Registration key of the GOAL / MATCH_START / MATCH_END detector.
pub const MATCH_EVENTS_DETECTOR: &str = "matchEvents";
/// Registration key of the match-end sync watcher.
pub const MATCH_STATUS_DETECTOR: &str = "matchStatus";

pub struct LivePipeline<S> {
    bus: Arc<EventBus>,
    state: Arc<StateStore>,
    detector: Arc<ChangeDetector>,
    poller: Arc<AdaptivePoller<S>>,
    config: ConfigStore<PollingConfig>,
}

impl<S: SnapshotSource + 'static> LivePipeline<S> {
    pub fn new(source: S, config: ConfigStore<PollingConfig>) -> Self {
        let bus = Arc::new(EventBus::new());
        let state = Arc::new(StateStore::default());
        let detector = Arc::new(ChangeDetector::new(Arc::clone(&bus)));
        detector.register(MATCH_EVENTS_DETECTOR, Arc::new(MatchEventsDetector::new()));

        let poller = Arc::new(AdaptivePoller::new(
            source,
            Arc::clone(&state),
            config.clone(),
        ));
        {
            let state = Arc::clone(&state);
            let detector = Arc::clone(&detector);
            poller.subscribe(move |snapshot| {
                apply_snapshot(&state, &detector, snapshot, OffsetDateTime::now_utc());
                Ok(())
            });
        }

        Self {
            bus,
            state,
            detector,
            poller,
            config,
        }
    }

    /// Register the match-end sync watcher.
    pub fn with_match_end_watcher(
        self,
        ledger: Arc<NotificationLedger>,
        notice_tx: MatchEndNoticeSender,
    ) -> Self {
        self.detector.register(
            MATCH_STATUS_DETECTOR,
            Arc::new(MatchEndWatcher::new(ledger, notice_tx)),
        );
        self
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn state(&self) -> &Arc<StateStore> {
        &self.state
    }

    pub fn detector(&self) -> &Arc<ChangeDetector> {
        &self.detector
    }

    pub fn poller(&self) -> &Arc<AdaptivePoller<S>> {
        &self.poller
    }

    pub fn config(&self) -> &ConfigStore<PollingConfig> {
        &self.config
    }

    /// Run the poller until shutdown is signaled.
    pub async fn run(&self, shutdown_rx: watch::Receiver<bool>) {
        self.poller.run(shutdown_rx, self.config.subscribe()).await;
    }
}

/// Update the application state from a fresh snapshot and diff its most
/// relevant match.
///
/// When the relevant match is a different fixture from the last one, the
/// baseline is dropped first, so two unrelated matches are never diffed.
fn apply_snapshot(
    state: &StateStore,
    detector: &ChangeDetector,
    snapshot: &Snapshot,
    now: OffsetDateTime,
) -> Vec<Event> {
    state.set(if snapshot.has_live_match() {
        ApplicationState::Live
    } else {
        ApplicationState::Idle
    });

    let matches = snapshot.all_matches();
    let Some(tracked) = select_relevant(&matches, now) else {
        return Vec::new();
    };
    let key = tracked.dedup_key();
    if let Some(previous) = detector.baseline_key().filter(|previous| *previous != key) {
        debug!(previous = %previous, current = %key, "Tracked match changed, resetting baseline");
        detector.reset();
    }
    detector.observe(tracked)
}
