//! Canonical itinerary representation.
//!
//! The generator's output shape is not strictly contracted: day indexes
//! arrive under differing field names (or not at all), activity text is a
//! single string or a list, and the JSON is often wrapped in markdown
//! fences. All of that tolerance lives here, applied exactly once when a
//! plan enters the system; everything downstream (voting, finalization,
//! confirmed details, chat context) consumes the canonical form.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryPlan {
    #[serde(default)]
    pub analysis_summary: String,
    pub options: Vec<ItineraryOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryOption {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub total_estimated_cost: String,
    pub vibe_match: String,
    pub why_its_perfect: String,
    pub days: Vec<DayEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    pub day: i64,
    pub activities: Vec<String>,
}

impl ItineraryPlan {
    /// Parses raw generator output into the canonical plan.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let cleaned = strip_code_fences(raw);
        let raw: RawPlan = serde_json::from_str(cleaned).map_err(|err| {
            AppError::Upstream(format!("itinerary generator returned malformed JSON: {err}"))
        })?;
        let plan = Self::from_raw(raw);
        if plan.options.is_empty() {
            return Err(AppError::Upstream(
                "itinerary generator returned no options".into(),
            ));
        }
        Ok(plan)
    }

    fn from_raw(raw: RawPlan) -> Self {
        let options = raw
            .options
            .into_iter()
            .enumerate()
            .map(|(idx, option)| ItineraryOption::from_raw(option, idx))
            .collect();
        Self {
            analysis_summary: raw.analysis_summary,
            options,
        }
    }

    pub fn option(&self, id: i64) -> Option<&ItineraryOption> {
        self.options.iter().find(|option| option.id == id)
    }

    pub fn option_ids(&self) -> Vec<i64> {
        self.options.iter().map(|option| option.id).collect()
    }
}

impl ItineraryOption {
    fn from_raw(raw: RawOption, position: usize) -> Self {
        let days = raw
            .itinerary
            .into_iter()
            .enumerate()
            .map(|(idx, day)| DayEntry {
                // Missing day index means "this slot": 1-based position.
                day: day.day.unwrap_or(idx as i64 + 1),
                activities: day.activity.map(OneOrMany::into_list).unwrap_or_default(),
            })
            .collect();
        Self {
            id: raw.id.unwrap_or(position as i64 + 1),
            title: raw.title,
            location: raw.location,
            total_estimated_cost: raw.total_estimated_cost,
            vibe_match: raw.vibe_match,
            why_its_perfect: raw.why_its_perfect,
            days,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default, alias = "summary")]
    analysis_summary: String,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default, alias = "name")]
    title: String,
    #[serde(default, alias = "destination")]
    location: String,
    #[serde(default, alias = "estimated_cost", alias = "cost")]
    total_estimated_cost: String,
    #[serde(default, alias = "vibe")]
    vibe_match: String,
    #[serde(default, alias = "why_it_fits", alias = "reason")]
    why_its_perfect: String,
    #[serde(default, alias = "days", alias = "plan")]
    itinerary: Vec<RawDay>,
}

#[derive(Debug, Deserialize)]
struct RawDay {
    #[serde(default, alias = "day_number", alias = "day_index")]
    day: Option<i64>,
    #[serde(default, alias = "activities")]
    activity: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_list(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_expected_generator_shape() {
        let raw = r#"{
            "analysis_summary": "Young group from coastal towns.",
            "options": [
                {
                    "id": 1,
                    "title": "Hidden Hills of Coorg",
                    "location": "Coorg, Karnataka",
                    "total_estimated_cost": "15,000 per person",
                    "vibe_match": "Nature & Chill",
                    "why_its_perfect": "Fits the budget and the calm vibe.",
                    "itinerary": [
                        { "day": 1, "activity": "Arrive and explore the estate" },
                        { "day": 2, "activity": "Waterfall trek" }
                    ]
                },
                {
                    "id": 2,
                    "title": "Varkala Cliffs",
                    "location": "Varkala, Kerala",
                    "total_estimated_cost": "12,000 per person",
                    "vibe_match": "Beach & Cafes",
                    "why_its_perfect": "Quieter than the obvious beach picks.",
                    "itinerary": [
                        { "day": 1, "activity": "Cliff walk" }
                    ]
                }
            ]
        }"#;
        let plan = ItineraryPlan::parse(raw).expect("plan parses");
        assert_eq!(plan.options.len(), 2);
        assert_eq!(plan.option_ids(), vec![1, 2]);
        assert_eq!(plan.options[0].days[1].day, 2);
        assert_eq!(
            plan.options[0].days[0].activities,
            vec!["Arrive and explore the estate".to_string()]
        );
    }

    #[test]
    fn tolerates_day_number_field_and_activity_lists() {
        let raw = r#"{
            "options": [
                {
                    "title": "Option",
                    "itinerary": [
                        { "day_number": 3, "activities": ["Kayak", "Camp"] }
                    ]
                }
            ]
        }"#;
        let plan = ItineraryPlan::parse(raw).expect("plan parses");
        let day = &plan.options[0].days[0];
        assert_eq!(day.day, 3);
        assert_eq!(day.activities, vec!["Kayak".to_string(), "Camp".to_string()]);
    }

    #[test]
    fn missing_day_indexes_fall_back_to_position() {
        let raw = r#"{
            "options": [
                {
                    "title": "Option",
                    "itinerary": [
                        { "activity": "First" },
                        { "activity": "Second" }
                    ]
                }
            ]
        }"#;
        let plan = ItineraryPlan::parse(raw).expect("plan parses");
        let days = &plan.options[0].days;
        assert_eq!(days[0].day, 1);
        assert_eq!(days[1].day, 2);
    }

    #[test]
    fn missing_option_ids_fall_back_to_position() {
        let raw = r#"{ "options": [ { "title": "A" }, { "title": "B" } ] }"#;
        let plan = ItineraryPlan::parse(raw).expect("plan parses");
        assert_eq!(plan.option_ids(), vec![1, 2]);
        assert!(plan.option(2).is_some());
        assert!(plan.option(3).is_none());
    }

    #[test]
    fn strips_markdown_code_fences() {
        let raw = "```json\n{ \"options\": [ { \"title\": \"A\" } ] }\n```";
        let plan = ItineraryPlan::parse(raw).expect("plan parses");
        assert_eq!(plan.options[0].title, "A");
    }

    #[test]
    fn malformed_json_is_an_upstream_error() {
        let err = ItineraryPlan::parse("not json").expect_err("must fail");
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn empty_option_sets_are_rejected() {
        let err = ItineraryPlan::parse(r#"{ "options": [] }"#).expect_err("must fail");
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn canonical_form_round_trips_through_storage() {
        let raw = r#"{ "options": [ { "title": "A", "itinerary": [ { "activity": "x" } ] } ] }"#;
        let plan = ItineraryPlan::parse(raw).expect("plan parses");
        let stored = serde_json::to_string(&plan).expect("serializes");
        let reread: ItineraryPlan = serde_json::from_str(&stored).expect("deserializes");
        assert_eq!(reread, plan);
    }
}
