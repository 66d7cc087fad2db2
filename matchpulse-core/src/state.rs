//! Application state shared by the poller and UI-facing collaborators.
//!
//! A small finite-state value with synchronous change notification. The
//! poller reads it to pick its cadence; the composition root and the
//! connectivity feeder write it.

use crate::utils::isolate::run_isolated;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationState {
    Idle,
    Loading,
    Live,
    Error,
    Offline,
}

impl ApplicationState {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationState::Idle => "idle",
            ApplicationState::Loading => "loading",
            ApplicationState::Live => "live",
            ApplicationState::Error => "error",
            ApplicationState::Offline => "offline",
        }
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid application state: {0:?}")]
pub struct InvalidState(pub String);

impl FromStr for ApplicationState {
    type Err = InvalidState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(ApplicationState::Idle),
            "loading" => Ok(ApplicationState::Loading),
            "live" => Ok(ApplicationState::Live),
            "error" => Ok(ApplicationState::Error),
            "offline" => Ok(ApplicationState::Offline),
            other => Err(InvalidState(other.to_string())),
        }
    }
}

/// Network reachability change reported by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivitySignal {
    Online,
    Offline,
}

pub type StateListener = Arc<dyn Fn(ApplicationState) + Send + Sync>;

/// Handle returned by [`StateStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Owner of the current [`ApplicationState`] and its listeners.
pub struct StateStore {
    inner: Mutex<StateInner>,
}

struct StateInner {
    current: ApplicationState,
    listeners: Vec<(ListenerId, StateListener)>,
    next_id: u64,
}

impl StateStore {
    pub fn new(initial: ApplicationState) -> Self {
        Self {
            inner: Mutex::new(StateInner {
                current: initial,
                listeners: Vec::new(),
                next_id: 0,
            }),
        }
    }

    pub fn get(&self) -> ApplicationState {
        self.inner.lock().current
    }

    pub fn is_live(&self) -> bool {
        self.get() == ApplicationState::Live
    }

    /// Transition to `next` and notify listeners in registration order.
    ///
    /// Setting the current state again is a no-op. Returns whether the state
    /// changed.
    pub fn set(&self, next: ApplicationState) -> bool {
        let listeners = {
            let mut inner = self.inner.lock();
            if inner.current == next {
                return false;
            }
            debug!(from = %inner.current, to = %next, "Application state transition");
            inner.current = next;
            inner
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect::<Vec<_>>()
        };

        for listener in listeners {
            run_isolated("state", "listener", || {
                listener(next);
                Ok(())
            });
        }
        true
    }

    /// Transition by name, as received from configuration or a UI layer.
    ///
    /// Unknown names are logged and leave the state unchanged.
    pub fn set_named(&self, name: &str) -> bool {
        match name.parse::<ApplicationState>() {
            Ok(next) => self.set(next),
            Err(e) => {
                warn!(error = %e, "Rejected application state transition");
                false
            }
        }
    }

    /// Register `listener`; it is called once right away with the current
    /// state, then on every later transition.
    pub fn subscribe(
        &self,
        listener: impl Fn(ApplicationState) + Send + Sync + 'static,
    ) -> ListenerId {
        let listener: StateListener = Arc::new(listener);
        let (id, current) = {
            let mut inner = self.inner.lock();
            let id = ListenerId(inner.next_id);
            inner.next_id += 1;
            inner.listeners.push((id, Arc::clone(&listener)));
            (id, inner.current)
        };

        run_isolated("state", "listener", || {
            listener(current);
            Ok(())
        });
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id);
        inner.listeners.len() != before
    }

    /// Feed a connectivity change into the state.
    ///
    /// Losing the network always forces `offline`. Regaining it only moves
    /// `offline` back to `idle`; the next poll re-establishes `live`.
    pub fn apply_connectivity(&self, signal: ConnectivitySignal) -> bool {
        match signal {
            ConnectivitySignal::Offline => self.set(ApplicationState::Offline),
            ConnectivitySignal::Online => {
                if self.get() != ApplicationState::Offline {
                    return false;
                }
                self.set(ApplicationState::Idle)
            }
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(ApplicationState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_store(initial: ApplicationState) -> (StateStore, Arc<Mutex<Vec<ApplicationState>>>) {
        let store = StateStore::new(initial);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |s| sink.lock().push(s));
        (store, seen)
    }

    #[test]
    fn test_subscribe_replays_current_state() {
        let (_store, seen) = recording_store(ApplicationState::Loading);
        assert_eq!(*seen.lock(), vec![ApplicationState::Loading]);
    }

    #[test]
    fn test_self_transition_does_not_notify() {
        let (store, seen) = recording_store(ApplicationState::Idle);
        assert!(!store.set(ApplicationState::Idle));
        assert!(store.set(ApplicationState::Live));
        assert!(!store.set(ApplicationState::Live));
        assert_eq!(*seen.lock(), vec![ApplicationState::Idle, ApplicationState::Live]);
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let (store, seen) = recording_store(ApplicationState::Idle);
        assert!(!store.set_named("halftime"));
        assert_eq!(store.get(), ApplicationState::Idle);
        assert!(store.set_named("error"));
        assert_eq!(store.get(), ApplicationState::Error);
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_listeners_run_in_order_and_failures_are_isolated() {
        let store = StateStore::default();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        store.subscribe(move |s| first.lock().push(("first", s)));
        store.subscribe(|s| {
            if s == ApplicationState::Live {
                panic!("listener failure");
            }
        });
        let third = Arc::clone(&order);
        store.subscribe(move |s| third.lock().push(("third", s)));

        store.set(ApplicationState::Live);
        let seen = order.lock().clone();
        assert_eq!(
            seen[2..],
            [("first", ApplicationState::Live), ("third", ApplicationState::Live)]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let store = StateStore::default();
        let count = Arc::new(Mutex::new(0));
        let c = Arc::clone(&count);
        let id = store.subscribe(move |_| *c.lock() += 1);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set(ApplicationState::Live);
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_connectivity_signals() {
        let store = StateStore::new(ApplicationState::Live);
        assert!(store.apply_connectivity(ConnectivitySignal::Offline));
        assert_eq!(store.get(), ApplicationState::Offline);

        assert!(store.apply_connectivity(ConnectivitySignal::Online));
        assert_eq!(store.get(), ApplicationState::Idle);

        store.set(ApplicationState::Live);
        assert!(!store.apply_connectivity(ConnectivitySignal::Online));
        assert_eq!(store.get(), ApplicationState::Live);
    }
}
