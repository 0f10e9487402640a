//! Profile pages and the one-time community survey.

use sqlx::types::Json;
use tracing::info;

use crate::{
    auth,
    error::AppError,
    models::wire::{
        ActionResponse, CommunityProfile, CompleteProfileRequest, ProfileResponse, TripSummary,
    },
    state::AppState,
};

pub async fn user_profile(state: &AppState, user_id: i64) -> Result<ProfileResponse, AppError> {
    let user = auth::fetch_user(state, user_id).await?;

    let created_trips = sqlx::query_as::<_, TripSummary>(
        "SELECT id, trip_code, trip_name, is_trip_confirmed, is_voting_closed \
         FROM trips WHERE leader_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    // Trips the user joined but does not lead; led trips already appear above.
    let joined_trips = sqlx::query_as::<_, TripSummary>(
        "SELECT t.id, t.trip_code, t.trip_name, t.is_trip_confirmed, t.is_voting_closed \
         FROM trips t JOIN trip_participants tp ON tp.trip_id = t.id \
         WHERE tp.user_id = ? AND t.leader_id != ? ORDER BY t.created_at DESC",
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    let community = if user.profile_completed {
        Some(CommunityProfile {
            vibe: user.travel_vibe.clone().unwrap_or_default(),
            pace: user.pace.clone().unwrap_or_default(),
            budget_tier: user.budget_tier.clone().unwrap_or_default(),
            diet: user.diet.clone().unwrap_or_default(),
            interests: user.interest_list(),
            bio: user.bio.clone().unwrap_or_default(),
        })
    } else {
        None
    };

    Ok(ProfileResponse {
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        gender: user.gender,
        age: user.age,
        profile_completed: user.profile_completed,
        community,
        created_trips,
        joined_trips,
    })
}

/// Stores the community survey and flips `profile_completed`. The flag is
/// one-way: repeat submissions refresh the fields but never clear it.
pub async fn complete_profile(
    state: &AppState,
    user_id: i64,
    req: &CompleteProfileRequest,
) -> Result<ActionResponse, AppError> {
    auth::fetch_user(state, user_id).await?;

    sqlx::query(
        "UPDATE users SET travel_vibe = ?, pace = ?, budget_tier = ?, diet = ?, \
         interests = ?, bio = ?, profile_completed = 1 WHERE id = ?",
    )
    .bind(&req.vibe)
    .bind(&req.pace)
    .bind(&req.budget_tier)
    .bind(&req.diet)
    .bind(Json(req.interests.clone()))
    .bind(&req.bio)
    .bind(user_id)
    .execute(&state.db)
    .await?;
    info!(user_id, "community profile completed");

    Ok(ActionResponse::success("Profile completed"))
}
