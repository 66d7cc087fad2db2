//! The categorized body served by `GET /api/data`.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::matches::Match;

/// One point-in-time view of every known match plus the standings tables.
///
/// Produced fresh on each request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Snapshot {
    pub matches: CategorizedMatches,
    /// Standings are passed through untouched; nothing in the live pipeline
    /// reads them.
    pub standings: Vec<serde_json::Value>,
}

/// Three disjoint buckets of matches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategorizedMatches {
    #[serde(default)]
    pub live: Vec<Match>,
    #[serde(default)]
    pub upcoming: Vec<Match>,
    #[serde(default)]
    pub finished: Vec<Match>,
}

impl Snapshot {
    /// All matches: live first, then upcoming, then finished.
    pub fn all_matches(&self) -> Vec<Match> {
        self.matches
            .live
            .iter()
            .chain(&self.matches.upcoming)
            .chain(&self.matches.finished)
            .cloned()
            .collect()
    }

    pub fn has_live_match(&self) -> bool {
        !self.matches.live.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.live.len() + self.matches.upcoming.len() + self.matches.finished.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a date-ordered match list the same way the data endpoint does.
///
/// The endpoint sorts matches by kickoff ascending and then reverses the
/// finished bucket so the most recent result comes first.
pub fn categorize(matches: Vec<Match>) -> CategorizedMatches {
    let mut categorized = CategorizedMatches::default();
    for m in matches {
        if m.status.is_listed_live() {
            categorized.live.push(m);
        } else if m.status == super::status::MatchStatus::Finished {
            categorized.finished.push(m);
        } else {
            categorized.upcoming.push(m);
        }
    }
    categorized.finished.reverse();
    categorized
}

#[derive(Deserialize)]
struct SnapshotBody {
    /// An object of buckets, or the flat list served by the remote fallback.
    #[serde(default)]
    matches: Value,
    #[serde(default)]
    standings: Vec<Value>,
}

#[derive(Default, Deserialize)]
struct RawBuckets {
    #[serde(default)]
    live: Vec<Value>,
    #[serde(default)]
    upcoming: Vec<Value>,
    #[serde(default)]
    finished: Vec<Value>,
}

/// Parse each row on its own. A malformed row is logged and dropped; the
/// rest of the snapshot stays usable.
fn parse_rows(bucket: &'static str, rows: Vec<Value>) -> Vec<Match> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<Match>(row) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!(bucket, index, error = %e, "Skipping malformed match row");
                None
            }
        })
        .collect()
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let body = SnapshotBody::deserialize(deserializer)?;
        let matches = match body.matches {
            Value::Null => CategorizedMatches::default(),
            Value::Object(buckets) => {
                let raw: RawBuckets =
                    serde_json::from_value(Value::Object(buckets)).map_err(D::Error::custom)?;
                CategorizedMatches {
                    live: parse_rows("live", raw.live),
                    upcoming: parse_rows("upcoming", raw.upcoming),
                    finished: parse_rows("finished", raw.finished),
                }
            }
            Value::Array(rows) => {
                let mut list = parse_rows("flat", rows);
                list.sort_by_key(|m| m.utc_date);
                categorize(list)
            }
            other => {
                return Err(D::Error::custom(format_args!(
                    "expected `matches` to be an object or an array, found {other}"
                )));
            }
        };
        Ok(Snapshot {
            matches,
            standings: body.standings.into_iter().filter(|s| !s.is_null()).collect(),
        })
    }
}
