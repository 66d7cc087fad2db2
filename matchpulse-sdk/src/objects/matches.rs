use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::status::MatchStatus;

/// Fallback dedup key used when the upstream row carries no id.
pub const ANONYMOUS_MATCH_KEY: &str = "current";

/// A single fixture as returned by the data endpoint.
///
/// Every field is owned, so `clone()` yields a fully independent copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(default)]
    pub id: Option<i64>,
    pub status: MatchStatus,
    /// Kickoff time.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub utc_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub matchday: Option<u32>,
    #[serde(default)]
    pub stage: Option<CompactString>,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub competition: Option<Competition>,
    #[serde(default)]
    pub venue: Option<String>,
}

impl Match {
    /// Full-time goals, with anything missing counted as zero.
    pub fn full_time_goals(&self) -> ScoreLine {
        self.score
            .as_ref()
            .and_then(|s| s.full_time)
            .unwrap_or_default()
    }

    /// Key used to deduplicate per-match side effects.
    pub fn dedup_key(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => ANONYMOUS_MATCH_KEY.to_string(),
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_name: Option<CompactString>,
    #[serde(default)]
    pub tla: Option<CompactString>,
    #[serde(default)]
    pub crest: Option<String>,
}

impl Team {
    /// Best available display name: short name, then full name, then TLA.
    pub fn display_name(&self) -> &str {
        self.short_name
            .as_deref()
            .or(self.name.as_deref())
            .or(self.tla.as_deref())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<CompactString>,
    #[serde(default)]
    pub emblem: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    #[serde(default)]
    pub winner: Option<CompactString>,
    #[serde(default)]
    pub duration: Option<CompactString>,
    #[serde(default)]
    pub full_time: Option<ScoreLine>,
    #[serde(default)]
    pub half_time: Option<ScoreLine>,
}

/// Goals per side. Upstream sends `null` for a side before kickoff; those
/// are read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreLine {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub home: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub away: u32,
}

impl ScoreLine {
    pub const fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }
}

fn null_as_zero<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATCH_JSON: &str = r#"{
        "id": 498112,
        "status": "IN_PLAY",
        "utcDate": "2025-03-08T20:00:00Z",
        "matchday": 27,
        "stage": "REGULAR_SEASON",
        "homeTeam": { "id": 81, "name": "FC Barcelona", "shortName": "Barça", "tla": "FCB" },
        "awayTeam": { "id": 90, "name": "Real Betis Balompié", "shortName": "Real Betis" },
        "score": { "winner": null, "duration": "REGULAR", "fullTime": { "home": 1, "away": null } },
        "competition": { "id": 2014, "name": "Primera Division", "code": "PD" },
        "referees": [],
        "tvChannels": ["Canal+"]
    }"#;

    #[test]
    fn test_parse_match_with_nulls_and_extra_fields() {
        let m: Match = serde_json::from_str(MATCH_JSON).unwrap();
        assert_eq!(m.id, Some(498112));
        assert_eq!(m.status, MatchStatus::InPlay);
        assert_eq!(m.full_time_goals(), ScoreLine::new(1, 0));
        assert_eq!(m.home_team.display_name(), "Barça");
        assert_eq!(m.utc_date.map(|d| d.unix_timestamp()), Some(1741464000));
        assert_eq!(m.dedup_key(), "498112");
    }

    #[test]
    fn test_missing_score_defaults_to_zero() {
        let m: Match = serde_json::from_str(
            r#"{ "status": "SCHEDULED", "homeTeam": {}, "awayTeam": { "name": "Girona FC" } }"#,
        )
        .unwrap();
        assert_eq!(m.full_time_goals(), ScoreLine::default());
        assert_eq!(m.dedup_key(), ANONYMOUS_MATCH_KEY);
        assert_eq!(m.home_team.display_name(), "Unknown");
        assert_eq!(m.team(Side::Away).display_name(), "Girona FC");
    }
}
