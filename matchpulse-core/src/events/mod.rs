//! Event system of the live pipeline.
//!
//! # Event Flow
//!
//! 1. `AdaptivePoller` fetches a `Snapshot` and hands its matches to subscribers
//! 2. `ChangeDetector` diffs the relevant match against the previous one
//! 3. Detectors return `EventPayload`s, published on the `EventBus`
//! 4. Consumers (ambient effects, notifications) react synchronously
//!
//! The match-end watcher is the one detector with a side effect: it queues a
//! `MatchEndNotice` for the `SyncNotifier` processor over an mpsc channel.

pub mod bus;
pub mod channels;
pub mod types;

pub use bus::{EventBus, EventHandler, HISTORY_CAPACITY, SharedHandler};
pub use channels::{
    DEFAULT_CHANNEL_BUFFER, MatchEndNoticeReceiver, MatchEndNoticeSender,
    match_end_notice_channel,
};
pub use types::{Event, EventKind, EventPayload, GoalPayload, MatchEndNotice, MatchLifecycle};
