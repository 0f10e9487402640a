use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

pub const GENDERS: [&str; 3] = ["Male", "Female", "Other"];

pub const SECURITY_QUESTIONS: [&str; 5] = [
    "What is the name of your first pet?",
    "What is your mother's maiden name?",
    "What was the name of your elementary school?",
    "What city were you born in?",
    "What is your favorite food?",
];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub age: i64,
    pub email: String,
    pub password_hash: String,
    pub security_question: String,
    pub security_answer_hash: String,
    pub profile_completed: bool,
    pub travel_vibe: Option<String>,
    pub pace: Option<String>,
    pub budget_tier: Option<String>,
    pub diet: Option<String>,
    pub interests: Option<Json<Vec<String>>>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn interest_list(&self) -> Vec<String> {
        self.interests
            .as_ref()
            .map(|tags| tags.0.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            first_name: "Asha".into(),
            last_name: "Nair".into(),
            gender: "Female".into(),
            age: 24,
            email: "asha@example.com".into(),
            password_hash: "hash".into(),
            security_question: SECURITY_QUESTIONS[0].into(),
            security_answer_hash: "hash".into(),
            profile_completed: false,
            travel_vibe: None,
            pace: None,
            budget_tier: None,
            diet: None,
            interests: None,
            bio: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn full_name_joins_first_and_last() {
        assert_eq!(sample_user().full_name(), "Asha Nair");
    }

    #[test]
    fn interest_list_defaults_to_empty() {
        assert!(sample_user().interest_list().is_empty());
        let mut user = sample_user();
        user.interests = Some(Json(vec!["hiking".into()]));
        assert_eq!(user.interest_list(), vec!["hiking".to_string()]);
    }
}
