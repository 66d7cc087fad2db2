//! User-facing notifications for match events.

use crate::events::{EventBus, EventKind, EventPayload, SharedHandler};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Something that can show a notification to the user.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> anyhow::Result<()>;
}

pub fn describe(payload: &EventPayload) -> Notification {
    match payload {
        EventPayload::Goal(goal) => Notification {
            title: "GOAL!".to_string(),
            body: format!(
                "{} scores! Score: {} - {}",
                goal.fixture.team(goal.team).display_name(),
                goal.score.home,
                goal.score.away
            ),
        },
        EventPayload::MatchStart(start) => Notification {
            title: "Kick-off!".to_string(),
            body: format!(
                "{} vs {}",
                start.fixture.home_team.display_name(),
                start.fixture.away_team.display_name()
            ),
        },
        EventPayload::MatchEnd(end) => {
            let score = end.fixture.full_time_goals();
            Notification {
                title: "Full time".to_string(),
                body: format!("Final score: {} - {}", score.home, score.away),
            }
        }
        EventPayload::RedCard(card) => Notification {
            title: "Red card".to_string(),
            body: format!(
                "{} vs {}",
                card.fixture.home_team.display_name(),
                card.fixture.away_team.display_name()
            ),
        },
    }
}

/// Forward GOAL, MATCH_START and MATCH_END to `sink`.
pub fn attach_notifications(
    bus: &EventBus,
    sink: Arc<dyn NotificationSink>,
) -> Vec<(EventKind, SharedHandler)> {
    [EventKind::Goal, EventKind::MatchStart, EventKind::MatchEnd]
        .into_iter()
        .map(|kind| {
            let sink = Arc::clone(&sink);
            let handler = bus.on_fn(kind, move |event| sink.deliver(&describe(&event.payload)));
            (kind, handler)
        })
        .collect()
}
