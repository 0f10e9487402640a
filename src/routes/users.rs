use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};

use crate::{
    error::AppError,
    models::wire::{ActionResponse, CompleteProfileRequest, ProfileResponse},
    services::profiles,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/:id/profile", get(profile))
        .route("/users/:id/complete-profile", put(complete_profile))
}

async fn profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(profiles::user_profile(&state, user_id).await?))
}

async fn complete_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<CompleteProfileRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        profiles::complete_profile(&state, user_id, &req).await?,
    ))
}
