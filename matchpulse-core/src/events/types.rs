//! Event type definitions.
//!
//! Events are emitted once and never mutated. Payloads carry a full copy of
//! the match so consumers never need to look anything up.

use matchpulse_sdk::objects::{Match, MatchStatus, ScoreLine, Side};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Public event names on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Goal,
    MatchStart,
    MatchEnd,
    /// No detector emits it until upstream data carries cards.
    RedCard,
    /// Reserved; no detector emits it until upstream data carries lineups.
    Substitution,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Goal => "GOAL",
            EventKind::MatchStart => "MATCH_START",
            EventKind::MatchEnd => "MATCH_END",
            EventKind::RedCard => "RED_CARD",
            EventKind::Substitution => "SUBSTITUTION",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened, with everything a consumer needs to render it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    Goal(GoalPayload),
    MatchStart(MatchLifecycle),
    MatchEnd(MatchLifecycle),
    /// Upstream data has no card details yet, so only the match is carried.
    RedCard(MatchLifecycle),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Goal(_) => EventKind::Goal,
            EventPayload::MatchStart(_) => EventKind::MatchStart,
            EventPayload::MatchEnd(_) => EventKind::MatchEnd,
            EventPayload::RedCard(_) => EventKind::RedCard,
        }
    }

    pub fn fixture(&self) -> &Match {
        match self {
            EventPayload::Goal(goal) => &goal.fixture,
            EventPayload::MatchStart(lifecycle)
            | EventPayload::MatchEnd(lifecycle)
            | EventPayload::RedCard(lifecycle) => {
                &lifecycle.fixture
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalPayload {
    /// The side whose score went up. When both did in one cycle this is
    /// always `Home`.
    pub team: Side,
    pub score: ScoreLine,
    #[serde(rename = "match")]
    pub fixture: Match,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchLifecycle {
    #[serde(rename = "match")]
    pub fixture: Match,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// A published event as recorded in the bus history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    #[serde(flatten)]
    pub payload: EventPayload,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

/// Request for the backend to persist a finished match's final data.
///
/// Sent by the match-end watcher to the `SyncNotifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEndNotice {
    /// Match id, or `current` when upstream omitted it.
    pub match_key: String,
    pub previous_status: MatchStatus,
    pub status: MatchStatus,
}
