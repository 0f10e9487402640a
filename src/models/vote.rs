use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TripVote {
    pub id: i64,
    pub trip_id: i64,
    pub user_id: i64,
    pub option_selected: i64,
}

/// Vote counts per option id. Every known option gets an entry, so the
/// client always sees zeros rather than missing keys; votes for options
/// that no longer exist are ignored.
pub fn tally(votes: &[TripVote], option_ids: &[i64]) -> BTreeMap<i64, i64> {
    let mut counts: BTreeMap<i64, i64> = option_ids.iter().map(|id| (*id, 0)).collect();
    for vote in votes {
        if let Some(count) = counts.get_mut(&vote.option_selected) {
            *count += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(user_id: i64, option: i64) -> TripVote {
        TripVote {
            id: 0,
            trip_id: 1,
            user_id,
            option_selected: option,
        }
    }

    #[test]
    fn tally_initialises_every_option_to_zero() {
        let counts = tally(&[], &[1, 2]);
        assert_eq!(counts.get(&1), Some(&0));
        assert_eq!(counts.get(&2), Some(&0));
    }

    #[test]
    fn tally_counts_and_ignores_unknown_options() {
        let votes = vec![vote(1, 1), vote(2, 1), vote(3, 9)];
        let counts = tally(&votes, &[1, 2]);
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), Some(&0));
        assert_eq!(counts.get(&9), None);
    }
}
