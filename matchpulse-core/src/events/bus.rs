//! In-process publish/subscribe registry with a bounded diagnostic history.
//!
//! Delivery is synchronous and best-effort: `emit` runs every handler for the
//! event's kind, in registration order, before returning. A handler added
//! after an event fired never sees it; the history is for inspection only.

use super::types::{Event, EventKind, EventPayload};
use crate::utils::isolate::run_isolated;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::debug;

/// Number of events retained for diagnostics.
pub const HISTORY_CAPACITY: usize = 10;

/// A bus subscriber.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event) -> anyhow::Result<()>;
}

impl<F> EventHandler for F
where
    F: Fn(&Event) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(&self, event: &Event) -> anyhow::Result<()> {
        self(event)
    }
}

pub type SharedHandler = Arc<dyn EventHandler>;

#[derive(Default)]
pub struct EventBus {
    inner: Mutex<BusInner>,
}

#[derive(Default)]
struct BusInner {
    handlers: HashMap<EventKind, Vec<SharedHandler>>,
    /// Newest first.
    history: VecDeque<Event>,
}

fn same_handler(a: &SharedHandler, b: &SharedHandler) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`.
    ///
    /// Handlers are a set: registering the same `Arc` twice is a no-op and
    /// returns `false`.
    pub fn on(&self, kind: EventKind, handler: SharedHandler) -> bool {
        let mut inner = self.inner.lock();
        let handlers = inner.handlers.entry(kind).or_default();
        if handlers.iter().any(|h| same_handler(h, &handler)) {
            return false;
        }
        handlers.push(handler);
        true
    }

    /// Register a closure and return the handle needed to remove it later.
    pub fn on_fn(
        &self,
        kind: EventKind,
        f: impl Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> SharedHandler {
        let handler: SharedHandler = Arc::new(f);
        self.on(kind, Arc::clone(&handler));
        handler
    }

    pub fn off(&self, kind: EventKind, handler: &SharedHandler) -> bool {
        let mut inner = self.inner.lock();
        let Some(handlers) = inner.handlers.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|h| !same_handler(h, handler));
        handlers.len() != before
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.inner.lock().handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Record `payload` in the history and deliver it to its handlers.
    pub fn emit(&self, payload: EventPayload) -> Event {
        let event = Event {
            payload,
            timestamp: OffsetDateTime::now_utc(),
        };
        let kind = event.kind();

        let handlers = {
            let mut inner = self.inner.lock();
            inner.history.push_front(event.clone());
            inner.history.truncate(HISTORY_CAPACITY);
            inner.handlers.get(&kind).cloned().unwrap_or_default()
        };

        debug!(event = %kind, handlers = handlers.len(), "Emitting event");
        for handler in handlers {
            run_isolated("event_bus", kind.as_str(), || handler.handle(&event));
        }
        event
    }

    /// The most recent events, newest first.
    pub fn history(&self) -> Vec<Event> {
        self.inner.lock().history.iter().cloned().collect()
    }
}
