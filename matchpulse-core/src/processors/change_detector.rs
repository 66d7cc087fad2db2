//! ChangeDetector processor.
//!
//! Holds the previous copy of the tracked match and runs every registered
//! [`Detector`] against each new one, publishing what they return on the
//! [`EventBus`]. The first observation only establishes the baseline.

use crate::detectors::Detector;
use crate::events::{Event, EventBus};
use crate::utils::isolate::run_isolated;
use kanau::processor::Processor;
use matchpulse_sdk::objects::Match;
use parking_lot::{Mutex, RwLock};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

type Registered = (String, Arc<dyn Detector>);

pub struct ChangeDetector {
    bus: Arc<EventBus>,
    previous: Mutex<Option<Match>>,
    /// Run in registration order. Keys are unique.
    detectors: RwLock<Vec<Registered>>,
}

impl ChangeDetector {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            previous: Mutex::new(None),
            detectors: RwLock::new(Vec::new()),
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Register `detector` under `key`.
    ///
    /// An existing detector with the same key is replaced in place, keeping
    /// its position. Returns `true` when something was replaced.
    pub fn register(&self, key: impl Into<String>, detector: Arc<dyn Detector>) -> bool {
        let key = key.into();
        let mut detectors = self.detectors.write();
        if let Some(slot) = detectors.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = detector;
            return true;
        }
        debug!(detector = %key, "Registered detector");
        detectors.push((key, detector));
        false
    }

    pub fn unregister(&self, key: &str) -> bool {
        let mut detectors = self.detectors.write();
        let before = detectors.len();
        detectors.retain(|(k, _)| k != key);
        detectors.len() != before
    }

    pub fn detector_keys(&self) -> Vec<String> {
        self.detectors.read().iter().map(|(k, _)| k.clone()).collect()
    }

    /// The last match passed to [`observe`](Self::observe), if any.
    pub fn previous(&self) -> Option<Match> {
        self.previous.lock().clone()
    }

    /// Dedup key of the baseline match, if any.
    pub fn baseline_key(&self) -> Option<String> {
        self.previous.lock().as_ref().map(Match::dedup_key)
    }

    /// Forget the baseline; the next observation emits nothing.
    pub fn reset(&self) {
        self.previous.lock().take();
    }

    /// Compare `current` with the previous observation and publish the
    /// resulting events, in detector registration order.
    ///
    /// The stored copy is replaced before any detector runs, so a failing
    /// detector never keeps the baseline stale.
    pub fn observe(&self, current: &Match) -> Vec<Event> {
        let Some(previous) = self.previous.lock().replace(current.clone()) else {
            debug!(match_key = %current.dedup_key(), "Established change baseline");
            return Vec::new();
        };

        let detectors = self.detectors.read().clone();
        let mut published = Vec::new();
        for (key, detector) in detectors {
            let Some(payloads) =
                run_isolated("change_detector", &key, || detector.detect(&previous, current))
            else {
                continue;
            };
            for payload in payloads {
                published.push(self.bus.emit(payload));
            }
        }
        published
    }
}

impl Processor<Match> for ChangeDetector {
    type Output = Vec<Event>;
    type Error = Infallible;

    async fn process(&self, current: Match) -> Result<Vec<Event>, Infallible> {
        Ok(self.observe(&current))
    }
}
