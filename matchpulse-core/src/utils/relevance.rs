use matchpulse_sdk::objects::Match;
use time::OffsetDateTime;

/// Picks the match whose kickoff is closest to `now`, past or future.
///
/// Ties go to the earliest element. Matches without a kickoff time are only
/// chosen when no match has one.
pub fn select_relevant(matches: &[Match], now: OffsetDateTime) -> Option<&Match> {
    matches.iter().min_by_key(|m| match m.utc_date {
        Some(kickoff) => (now - kickoff).abs(),
        None => time::Duration::MAX,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MatchBuilder;
    use time::macros::datetime;

    #[test]
    fn test_closest_kickoff_wins() {
        let now = datetime!(2025-03-08 21:00 UTC);
        let matches = vec![
            MatchBuilder::new(1).kickoff(datetime!(2025-03-01 20:00 UTC)).build(),
            MatchBuilder::new(2).kickoff(datetime!(2025-03-08 20:00 UTC)).build(),
            MatchBuilder::new(3).kickoff(datetime!(2025-03-09 18:00 UTC)).build(),
        ];
        assert_eq!(select_relevant(&matches, now).and_then(|m| m.id), Some(2));
    }

    #[test]
    fn test_ties_keep_list_order() {
        let now = datetime!(2025-03-08 12:00 UTC);
        let matches = vec![
            MatchBuilder::new(1).build(),
            MatchBuilder::new(2).kickoff(datetime!(2025-03-08 10:00 UTC)).build(),
            MatchBuilder::new(3).kickoff(datetime!(2025-03-08 14:00 UTC)).build(),
        ];
        assert_eq!(select_relevant(&matches, now).and_then(|m| m.id), Some(2));
    }

    #[test]
    fn test_empty_and_undated() {
        let now = datetime!(2025-03-08 12:00 UTC);
        assert!(select_relevant(&[], now).is_none());
        let undated = vec![MatchBuilder::new(9).build(), MatchBuilder::new(10).build()];
        assert_eq!(select_relevant(&undated, now).and_then(|m| m.id), Some(9));
    }
}
