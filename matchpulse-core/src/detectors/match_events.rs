//! Built-in GOAL / MATCH_START / MATCH_END detection.

use super::{Detected, Detector};
use crate::events::{EventPayload, GoalPayload, MatchLifecycle};
use matchpulse_sdk::objects::{Match, MatchStatus, ScoreLine, Side};
use time::OffsetDateTime;

/// Emits match lifecycle and goal events.
///
/// Rules are evaluated independently, so one transition may yield several
/// events (for example a goal scored right before the final whistle).
#[derive(Debug, Default, Clone, Copy)]
pub struct MatchEventsDetector;

impl MatchEventsDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for MatchEventsDetector {
    fn detect(&self, previous: &Match, current: &Match) -> anyhow::Result<Detected> {
        let mut events = Detected::new();
        let now = OffsetDateTime::now_utc();

        if previous.status == MatchStatus::Scheduled && current.status.is_live() {
            events.push(EventPayload::MatchStart(MatchLifecycle {
                fixture: current.clone(),
                timestamp: now,
            }));
        }

        if previous.status.is_live() && current.status == MatchStatus::Finished {
            events.push(EventPayload::MatchEnd(MatchLifecycle {
                fixture: current.clone(),
                timestamp: now,
            }));
        }

        if let Some(team) = scoring_side(previous.full_time_goals(), current.full_time_goals()) {
            events.push(EventPayload::Goal(GoalPayload {
                team,
                score: current.full_time_goals(),
                fixture: current.clone(),
            }));
        }

        Ok(events)
    }
}

/// The side whose goal count went up.
///
/// Reports at most one side per comparison: when both increased between two
/// polls, only `Home` is returned.
fn scoring_side(old: ScoreLine, new: ScoreLine) -> Option<Side> {
    if new.home > old.home {
        Some(Side::Home)
    } else if new.away > old.away {
        Some(Side::Away)
    } else {
        None
    }
}
