//! Test doubles shared by the unit tests.

use crate::consumers::{Notification, NotificationSink};
use crate::source::{FetchMode, SnapshotSource, SourceError};
use async_trait::async_trait;
use matchpulse_sdk::objects::{Match, MatchStatus, Score, ScoreLine, Snapshot, Team, categorize};
use parking_lot::Mutex;
use std::collections::VecDeque;
use time::OffsetDateTime;

/// Builds a `Match` with only the fields a test cares about.
pub struct MatchBuilder {
    fixture: Match,
}

impl MatchBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            fixture: Match {
                id: Some(id),
                status: MatchStatus::Scheduled,
                utc_date: None,
                matchday: None,
                stage: None,
                home_team: Team::default(),
                away_team: Team::default(),
                score: None,
                competition: None,
                venue: None,
            },
        }
    }

    pub fn status(mut self, status: MatchStatus) -> Self {
        self.fixture.status = status;
        self
    }

    pub fn kickoff(mut self, kickoff: OffsetDateTime) -> Self {
        self.fixture.utc_date = Some(kickoff);
        self
    }

    pub fn score(mut self, home: u32, away: u32) -> Self {
        self.fixture.score = Some(Score {
            full_time: Some(ScoreLine::new(home, away)),
            ..Score::default()
        });
        self
    }

    /// `(id, short name)` for home and away.
    pub fn teams(mut self, home: (i64, &str), away: (i64, &str)) -> Self {
        let team = |(id, name): (i64, &str)| Team {
            id: Some(id),
            short_name: Some(name.into()),
            ..Team::default()
        };
        self.fixture.home_team = team(home);
        self.fixture.away_team = team(away);
        self
    }

    pub fn build(self) -> Match {
        self.fixture
    }
}

/// Replays queued results in order, then fails.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Snapshot, SourceError>>>,
    modes: Mutex<Vec<FetchMode>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, matches: Vec<Match>) {
        self.script.lock().push_back(Ok(Snapshot {
            matches: categorize(matches),
            standings: Vec::new(),
        }));
    }

    pub fn push_err(&self, error: SourceError) {
        self.script.lock().push_back(Err(error));
    }

    pub fn calls(&self) -> usize {
        self.modes.lock().len()
    }

    pub fn modes(&self) -> Vec<FetchMode> {
        self.modes.lock().clone()
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    async fn fetch(&self, mode: FetchMode) -> Result<Snapshot, SourceError> {
        self.modes.lock().push(mode);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(SourceError::Transport("script exhausted".into())))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        self.delivered.lock().push(notification.clone());
        Ok(())
    }
}
