//! Long-running and per-snapshot processors of the live pipeline.
//!
//! - `AdaptivePoller`: fetches snapshots on an adaptive schedule, hands them to subscribers
//! - `ChangeDetector`: diffs the tracked match, publishes events on the `EventBus`
//! - `SyncNotifier`: receives `MatchEndNotice`, notifies the backend

pub mod change_detector;
pub mod poller;
pub mod sync_notifier;

pub use change_detector::ChangeDetector;
pub use poller::{ActivitySignal, AdaptivePoller, ScheduleDecision, SnapshotSubscriber, SubscriberId};
pub use sync_notifier::{NotifyError, SyncEndpoint, SyncNotifier};
