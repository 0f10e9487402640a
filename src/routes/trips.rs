use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::wire::{
        ActionResponse, ConfirmedDetailsResponse, CreateTripRequest, CreateTripResponse,
        FinalizeResponse, GenerateResponse, ItineraryStateResponse, JoinTripRequest,
        JoinTripResponse, PublicTripCard, TripDetailResponse, VoteResponse,
    },
    services::trips,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips/create", post(create))
        .route("/trips/join", post(join))
        .route("/trips/public", get(public_feed))
        .route("/trips/:id", get(detail).delete(remove))
        .route("/trips/:id/lock", post(lock))
        .route("/trips/:id/leave", delete(leave))
        .route("/trips/:id/generate", post(generate))
        .route("/trips/:id/itinerary", get(itinerary))
        .route("/trips/:id/vote", post(vote))
        .route("/trips/:id/finalize", post(finalize))
        .route("/trips/:id/confirmed-details", get(confirmed_details))
}

/// Caller identity for leader/participant actions.
#[derive(Deserialize)]
struct ActorQuery {
    user_id: i64,
}

#[derive(Deserialize)]
struct OptionQuery {
    user_id: i64,
    option_id: i64,
}

#[derive(Deserialize)]
struct ViewerQuery {
    user_id: Option<i64>,
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateTripRequest>,
) -> Result<Json<CreateTripResponse>, AppError> {
    Ok(Json(trips::create_trip(&state, &req).await?))
}

async fn join(
    State(state): State<AppState>,
    Json(req): Json<JoinTripRequest>,
) -> Result<Json<JoinTripResponse>, AppError> {
    Ok(Json(trips::join_trip(&state, &req).await?))
}

async fn detail(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripDetailResponse>, AppError> {
    Ok(Json(trips::trip_detail(&state, trip_id).await?))
}

async fn lock(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(trips::lock_trip(&state, trip_id, actor.user_id).await?))
}

async fn remove(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        trips::delete_trip(&state, trip_id, actor.user_id).await?,
    ))
}

async fn leave(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        trips::leave_trip(&state, trip_id, actor.user_id).await?,
    ))
}

async fn generate(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<GenerateResponse>, AppError> {
    Ok(Json(
        trips::generate_itinerary(&state, trip_id, actor.user_id).await?,
    ))
}

async fn itinerary(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Query(viewer): Query<ViewerQuery>,
) -> Result<Json<ItineraryStateResponse>, AppError> {
    Ok(Json(
        trips::itinerary_state(&state, trip_id, viewer.user_id).await?,
    ))
}

async fn vote(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Query(query): Query<OptionQuery>,
) -> Result<Json<VoteResponse>, AppError> {
    Ok(Json(
        trips::cast_vote(&state, trip_id, query.user_id, query.option_id).await?,
    ))
}

async fn finalize(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Query(query): Query<OptionQuery>,
) -> Result<Json<FinalizeResponse>, AppError> {
    Ok(Json(
        trips::finalize_option(&state, trip_id, query.user_id, query.option_id).await?,
    ))
}

async fn confirmed_details(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<ConfirmedDetailsResponse>, AppError> {
    Ok(Json(trips::confirmed_details(&state, trip_id).await?))
}

async fn public_feed(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicTripCard>>, AppError> {
    Ok(Json(trips::public_trips(&state).await?))
}
