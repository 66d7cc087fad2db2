//! Change detectors run by the [`ChangeDetector`](crate::processors::ChangeDetector).
//!
//! A detector compares the previous and current copy of the tracked match
//! and returns the events that transition produced. Detectors are registered
//! under a key and may be swapped or removed independently.

pub mod match_end;
pub mod match_events;

pub use match_end::MatchEndWatcher;
pub use match_events::MatchEventsDetector;

use crate::events::EventPayload;
use matchpulse_sdk::objects::Match;
use smallvec::SmallVec;

/// Events produced by one detector for one transition.
pub type Detected = SmallVec<[EventPayload; 2]>;

pub trait Detector: Send + Sync {
    fn detect(&self, previous: &Match, current: &Match) -> anyhow::Result<Detected>;
}

impl<F> Detector for F
where
    F: Fn(&Match, &Match) -> anyhow::Result<Detected> + Send + Sync,
{
    fn detect(&self, previous: &Match, current: &Match) -> anyhow::Result<Detected> {
        self(previous, current)
    }
}
