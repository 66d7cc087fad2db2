//! Match status as reported by the data endpoint.
//!
//! Upstream providers disagree on spelling (`IN_PLAY` vs `1H`, `FT` vs
//! `FINISHED`), so parsing is case-insensitive and accepts every alias the
//! endpoint has been seen to return. Unrecognised values are preserved in
//! [`MatchStatus::Other`] rather than rejected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    Scheduled,
    Timed,
    Live,
    InPlay,
    Paused,
    HalfTime,
    ExtraTime,
    PenaltyShootout,
    /// Provider shorthand for a first half in progress (`1H`).
    FirstHalf,
    /// Provider shorthand for a second half in progress (`2H`).
    SecondHalf,
    /// Provider shorthand for full time (`FT`).
    FullTime,
    Finished,
    AfterExtraTime,
    Postponed,
    Suspended,
    Cancelled,
    Awarded,
    Other(String),
}

impl MatchStatus {
    /// Statuses counted as "in progress" for match start/end detection.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            MatchStatus::Live
                | MatchStatus::InPlay
                | MatchStatus::Paused
                | MatchStatus::HalfTime
                | MatchStatus::ExtraTime
                | MatchStatus::PenaltyShootout
        )
    }

    /// Broader in-progress set, including the half shorthands.
    pub fn is_live_like(&self) -> bool {
        self.is_live() || matches!(self, MatchStatus::FirstHalf | MatchStatus::SecondHalf)
    }

    /// Any of the terminal "the whistle has gone" spellings.
    pub fn is_finished_like(&self) -> bool {
        matches!(
            self,
            MatchStatus::FullTime | MatchStatus::Finished | MatchStatus::AfterExtraTime
        )
    }

    /// The status set the data endpoint files under `live`.
    pub fn is_listed_live(&self) -> bool {
        matches!(
            self,
            MatchStatus::Live | MatchStatus::InPlay | MatchStatus::Paused | MatchStatus::HalfTime
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            MatchStatus::Scheduled => "SCHEDULED",
            MatchStatus::Timed => "TIMED",
            MatchStatus::Live => "LIVE",
            MatchStatus::InPlay => "IN_PLAY",
            MatchStatus::Paused => "PAUSED",
            MatchStatus::HalfTime => "HALF_TIME",
            MatchStatus::ExtraTime => "EXTRA_TIME",
            MatchStatus::PenaltyShootout => "PENALTY_SHOOTOUT",
            MatchStatus::FirstHalf => "1H",
            MatchStatus::SecondHalf => "2H",
            MatchStatus::FullTime => "FT",
            MatchStatus::Finished => "FINISHED",
            MatchStatus::AfterExtraTime => "AET",
            MatchStatus::Postponed => "POSTPONED",
            MatchStatus::Suspended => "SUSPENDED",
            MatchStatus::Cancelled => "CANCELLED",
            MatchStatus::Awarded => "AWARDED",
            MatchStatus::Other(raw) => raw.as_str(),
        }
    }
}

impl FromStr for MatchStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let status = match normalized.as_str() {
            "SCHEDULED" => MatchStatus::Scheduled,
            "TIMED" => MatchStatus::Timed,
            "LIVE" => MatchStatus::Live,
            "IN_PLAY" => MatchStatus::InPlay,
            "PAUSED" => MatchStatus::Paused,
            "HALF_TIME" | "HALFTIME" | "HT" => MatchStatus::HalfTime,
            "EXTRA_TIME" | "ET" => MatchStatus::ExtraTime,
            "PENALTY_SHOOTOUT" | "PENALTIES" | "P" => MatchStatus::PenaltyShootout,
            "1H" => MatchStatus::FirstHalf,
            "2H" => MatchStatus::SecondHalf,
            "FT" | "FULL_TIME" => MatchStatus::FullTime,
            "FINISHED" => MatchStatus::Finished,
            "AET" | "AFTER_EXTRA_TIME" => MatchStatus::AfterExtraTime,
            "POSTPONED" => MatchStatus::Postponed,
            "SUSPENDED" => MatchStatus::Suspended,
            "CANCELLED" | "CANCELED" => MatchStatus::Cancelled,
            "AWARDED" => MatchStatus::Awarded,
            _ => MatchStatus::Other(s.to_string()),
        };
        Ok(status)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MatchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MatchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let Ok(status) = raw.parse::<MatchStatus>();
        Ok(status)
    }
}
