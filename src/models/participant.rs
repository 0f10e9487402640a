use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

use crate::models::wire::StatItem;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TripParticipant {
    pub id: i64,
    pub trip_id: i64,
    pub user_id: i64,
    pub home_town: String,
    pub budget_range: String,
    pub start_date: String,
    pub end_date: String,
    pub preference_tags: Json<Vec<String>>,
}

/// Frequency of each budget range across the group, for the dashboard chart.
pub fn budget_stats(participants: &[TripParticipant]) -> Vec<StatItem> {
    count_sorted(participants.iter().map(|p| p.budget_range.clone()), None)
}

/// Most common preference tags across the group, capped at `top_n`.
pub fn tag_stats(participants: &[TripParticipant], top_n: usize) -> Vec<StatItem> {
    count_sorted(
        participants
            .iter()
            .flat_map(|p| p.preference_tags.0.iter().cloned()),
        Some(top_n),
    )
}

fn count_sorted(values: impl Iterator<Item = String>, top_n: Option<usize>) -> Vec<StatItem> {
    let mut counts: HashMap<String, i64> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut stats: Vec<StatItem> = counts
        .into_iter()
        .map(|(name, value)| StatItem { name, value })
        .collect();
    // Value descending, then name, so equal counts render stably.
    stats.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    if let Some(n) = top_n {
        stats.truncate(n);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(budget: &str, tags: &[&str]) -> TripParticipant {
        TripParticipant {
            id: 0,
            trip_id: 1,
            user_id: 1,
            home_town: "Pune".into(),
            budget_range: budget.into(),
            start_date: "2026-09-01".into(),
            end_date: "2026-09-05".into(),
            preference_tags: Json(tags.iter().map(|t| t.to_string()).collect()),
        }
    }

    #[test]
    fn budget_stats_count_each_range() {
        let group = vec![
            participant("Low", &[]),
            participant("Low", &[]),
            participant("High", &[]),
        ];
        let stats = budget_stats(&group);
        assert_eq!(stats[0].name, "Low");
        assert_eq!(stats[0].value, 2);
        assert_eq!(stats[1].name, "High");
        assert_eq!(stats[1].value, 1);
    }

    #[test]
    fn tag_stats_flatten_and_cap() {
        let group = vec![
            participant("Low", &["Beach", "Food"]),
            participant("Low", &["Beach", "Trek"]),
            participant("Low", &["Beach", "Food"]),
        ];
        let stats = tag_stats(&group, 2);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "Beach");
        assert_eq!(stats[0].value, 3);
        assert_eq!(stats[1].name, "Food");
        assert_eq!(stats[1].value, 2);
    }
}
