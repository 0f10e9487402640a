//! Request and response payloads for the HTTP contract. The server
//! handlers and the client SDK share these types, so the two sides cannot
//! drift apart.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

use crate::{
    lifecycle::TripPhase,
    models::{
        itinerary::{DayEntry, ItineraryPlan},
        user::User,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub age: i64,
    pub email: String,
    pub password: String,
    pub security_question: String,
    pub security_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The record the client keeps as its session for the rest of the visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user_id: i64,
    pub first_name: String,
    pub name: String,
    pub email: String,
    pub profile_completed: bool,
}

impl From<&User> for LoginResponse {
    fn from(user: &User) -> Self {
        Self {
            message: "Login successful".into(),
            user_id: user.id,
            first_name: user.first_name.clone(),
            name: user.full_name(),
            email: user.email.clone(),
            profile_completed: user.profile_completed,
        }
    }
}

fn default_false() -> bool {
    false
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTripRequest {
    pub user_id: i64,
    pub trip_name: String,
    pub home_town: String,
    pub budget_range: String,
    pub start_date: String,
    pub end_date: String,
    pub preference_tags: Vec<String>,
    pub voting_days: i64,
    #[serde(default = "default_false")]
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTripResponse {
    pub status: String,
    pub trip_id: i64,
    pub trip_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinTripRequest {
    pub user_id: i64,
    pub trip_code: String,
    pub home_town: String,
    pub budget_range: String,
    pub start_date: String,
    pub end_date: String,
    pub preference_tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinTripResponse {
    pub status: String,
    pub trip_id: i64,
    pub trip_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatItem {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripDetailResponse {
    pub id: i64,
    pub trip_name: String,
    pub trip_code: String,
    pub leader_id: i64,
    pub is_trip_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub phase: TripPhase,
    pub participants: Vec<String>,
    pub has_itinerary: bool,
    pub budget_stats: Vec<StatItem>,
    pub tag_stats: Vec<StatItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    pub message: String,
}

impl ActionResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub status: String,
    pub data: ItineraryPlan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryStateResponse {
    pub has_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ItineraryPlan>,
    #[serde(default)]
    pub votes: BTreeMap<i64, i64>,
    #[serde(default)]
    pub user_vote: Option<i64>,
    #[serde(default)]
    pub final_choice: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedDetailsResponse {
    pub id: i64,
    pub trip_name: String,
    pub trip_code: String,
    pub location: String,
    pub itinerary: Vec<DayEntry>,
    pub participants: Vec<ParticipantRef>,
    pub start_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TripSummary {
    pub id: i64,
    pub trip_code: String,
    pub trip_name: String,
    pub is_trip_confirmed: bool,
    pub is_voting_closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityProfile {
    pub vibe: String,
    pub pace: String,
    pub budget_tier: String,
    pub diet: String,
    pub interests: Vec<String>,
    pub bio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub age: i64,
    pub profile_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<CommunityProfile>,
    pub created_trips: Vec<TripSummary>,
    pub joined_trips: Vec<TripSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteProfileRequest {
    pub vibe: String,
    pub pace: String,
    pub budget_tier: String,
    pub diet: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicTripCard {
    pub id: i64,
    pub trip_name: String,
    pub trip_code: String,
    pub leader_name: String,
    pub home_town: String,
    pub start_date: String,
    pub budget_range: String,
    pub preference_tags: Json<Vec<String>>,
}

/// Error body shared by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
