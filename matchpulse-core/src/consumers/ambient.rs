//! Ambient lighting driven by match events.
//!
//! The engine keeps one active effect at a time. Timed effects fall back to
//! [`AmbientEffect::Default`] once their duration has elapsed; a new timed
//! effect replaces the running one and restarts the clock.

use crate::events::{EventBus, EventKind, EventPayload, SharedHandler};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// Team whose goals get the celebratory effect when nothing is configured.
pub const DEFAULT_FOLLOWED_TEAM_ID: i64 = 81;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmbientEffect {
    Default,
    TeamGoal,
    OpponentGoal,
    RedCard,
    LivePulse,
}

impl AmbientEffect {
    pub fn color(self) -> &'static str {
        match self {
            AmbientEffect::Default => "#1a1a2e",
            AmbientEffect::TeamGoal => "#00D9FF",
            AmbientEffect::OpponentGoal => "#FF4444",
            AmbientEffect::RedCard => "#CC0000",
            AmbientEffect::LivePulse => "#FFD700",
        }
    }

    /// `None` for the resting state.
    pub fn duration(self) -> Option<Duration> {
        match self {
            AmbientEffect::Default => None,
            AmbientEffect::TeamGoal | AmbientEffect::OpponentGoal => Some(Duration::from_secs(8)),
            AmbientEffect::RedCard => Some(Duration::from_secs(10)),
            AmbientEffect::LivePulse => Some(Duration::from_secs(5)),
        }
    }
}

pub struct AmbientEngine {
    followed_team_id: i64,
    /// Active timed effect and when it expires.
    active: Mutex<Option<(AmbientEffect, Instant)>>,
}

impl AmbientEngine {
    pub fn new(followed_team_id: i64) -> Self {
        Self {
            followed_team_id,
            active: Mutex::new(None),
        }
    }

    pub fn effect(&self) -> AmbientEffect {
        self.effect_at(Instant::now())
    }

    pub fn effect_at(&self, now: Instant) -> AmbientEffect {
        match *self.active.lock() {
            Some((effect, until)) if now < until => effect,
            _ => AmbientEffect::Default,
        }
    }

    pub fn color(&self) -> &'static str {
        self.effect().color()
    }

    /// The effect an event calls for.
    pub fn effect_for(&self, payload: &EventPayload) -> AmbientEffect {
        match payload {
            EventPayload::Goal(goal) => {
                let scorer = goal.fixture.team(goal.team);
                if scorer.id == Some(self.followed_team_id) {
                    AmbientEffect::TeamGoal
                } else {
                    AmbientEffect::OpponentGoal
                }
            }
            EventPayload::MatchStart(_) => AmbientEffect::LivePulse,
            EventPayload::MatchEnd(_) => AmbientEffect::Default,
            EventPayload::RedCard(_) => AmbientEffect::RedCard,
        }
    }

    pub fn apply(&self, payload: &EventPayload) -> AmbientEffect {
        self.apply_at(payload, Instant::now())
    }

    pub fn apply_at(&self, payload: &EventPayload, now: Instant) -> AmbientEffect {
        let effect = self.effect_for(payload);
        self.trigger_at(effect, now);
        effect
    }

    /// Start `effect` directly, bypassing the bus.
    pub fn trigger_at(&self, effect: AmbientEffect, now: Instant) {
        let mut active = self.active.lock();
        *active = effect.duration().map(|d| (effect, now + d));
        info!(effect = ?effect, color = effect.color(), "Ambient effect changed");
    }

    /// Subscribe to every event kind that changes the lighting.
    ///
    /// Returns the registered handlers so the caller can detach them.
    pub fn attach(self: &Arc<Self>, bus: &EventBus) -> Vec<(EventKind, SharedHandler)> {
        [
            EventKind::Goal,
            EventKind::MatchStart,
            EventKind::MatchEnd,
            EventKind::RedCard,
        ]
        .into_iter()
        .map(|kind| {
            let engine = Arc::clone(self);
            let handler = bus.on_fn(kind, move |event| {
                engine.apply(&event.payload);
                Ok(())
            });
            (kind, handler)
        })
        .collect()
    }
}

impl Default for AmbientEngine {
    fn default() -> Self {
        Self::new(DEFAULT_FOLLOWED_TEAM_ID)
    }
}
