use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use crate::{
    error::AppError,
    models::wire::{ChatRequest, ChatResponse},
    services::trips,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/trips/:id/chat", post(chat))
}

async fn chat(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    Ok(Json(trips::chat(&state, trip_id, &req.message).await?))
}
