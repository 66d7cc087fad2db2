//! Data types served by the matchpulse data endpoint.

pub mod matches;
pub mod snapshot;
pub mod status;

pub use matches::{ANONYMOUS_MATCH_KEY, Competition, Match, Score, ScoreLine, Side, Team};
pub use snapshot::{CategorizedMatches, Snapshot, categorize};
pub use status::MatchStatus;
