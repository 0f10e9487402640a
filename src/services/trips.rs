//! Trip lifecycle, voting and chat operations. Route handlers stay thin;
//! everything that touches trip state goes through here so the lifecycle
//! guards cannot be bypassed.

use chrono::{Duration, Utc};
use sqlx::types::Json;
use tracing::info;

use crate::{
    error::AppError,
    lifecycle::{self, FinalizeDisposition, TripPhase},
    models::{
        participant::{self, TripParticipant},
        trip::{self, Trip},
        vote::{self, TripVote},
        wire::{
            ActionResponse, ChatResponse, ConfirmedDetailsResponse, CreateTripRequest,
            CreateTripResponse, FinalizeResponse, GenerateResponse, ItineraryStateResponse,
            JoinTripRequest, JoinTripResponse, ParticipantRef, PublicTripCard, TripDetailResponse,
            VoteResponse,
        },
    },
    services::recommend::{ChatContext, TravelerProfile},
    state::AppState,
};

const TAG_STATS_LIMIT: usize = 5;

pub async fn fetch_trip(state: &AppState, trip_id: i64) -> Result<Trip, AppError> {
    sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = ?")
        .bind(trip_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".into()))
}

async fn fetch_participants(state: &AppState, trip_id: i64) -> Result<Vec<TripParticipant>, AppError> {
    let participants = sqlx::query_as::<_, TripParticipant>(
        "SELECT * FROM trip_participants WHERE trip_id = ? ORDER BY id",
    )
    .bind(trip_id)
    .fetch_all(&state.db)
    .await?;
    Ok(participants)
}

async fn fetch_participant_names(state: &AppState, trip_id: i64) -> Result<Vec<String>, AppError> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT u.first_name FROM trip_participants tp \
         JOIN users u ON u.id = tp.user_id \
         WHERE tp.trip_id = ? ORDER BY tp.id",
    )
    .bind(trip_id)
    .fetch_all(&state.db)
    .await?;
    Ok(names)
}

async fn is_participant(state: &AppState, trip_id: i64, user_id: i64) -> Result<bool, AppError> {
    let row = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM trip_participants WHERE trip_id = ? AND user_id = ?",
    )
    .bind(trip_id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?;
    Ok(row.is_some())
}

pub async fn create_trip(
    state: &AppState,
    req: &CreateTripRequest,
) -> Result<CreateTripResponse, AppError> {
    if req.trip_name.trim().is_empty() {
        return Err(AppError::Validation("Trip name must not be empty".into()));
    }
    if req.voting_days < 1 {
        return Err(AppError::Validation(
            "Voting window must be at least one day".into(),
        ));
    }

    let mut tx = state.db.begin().await?;

    let mut code = trip::generate_trip_code(&mut rand::thread_rng());
    while sqlx::query_scalar::<_, i64>("SELECT id FROM trips WHERE trip_code = ?")
        .bind(&code)
        .fetch_optional(&mut *tx)
        .await?
        .is_some()
    {
        code = trip::generate_trip_code(&mut rand::thread_rng());
    }

    let now = Utc::now();
    let deadline = now + Duration::days(req.voting_days);
    let result = sqlx::query(
        "INSERT INTO trips (trip_name, trip_code, leader_id, is_public, created_at, \
         voting_deadline) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&req.trip_name)
    .bind(&code)
    .bind(req.user_id)
    .bind(req.is_public)
    .bind(now)
    .bind(deadline)
    .execute(&mut *tx)
    .await?;
    let trip_id = result.last_insert_rowid();

    // The leader is always the first participant.
    sqlx::query(
        "INSERT INTO trip_participants (trip_id, user_id, home_town, budget_range, \
         start_date, end_date, preference_tags) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(trip_id)
    .bind(req.user_id)
    .bind(&req.home_town)
    .bind(&req.budget_range)
    .bind(&req.start_date)
    .bind(&req.end_date)
    .bind(Json(req.preference_tags.clone()))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(trip_id, %code, "trip created");

    Ok(CreateTripResponse {
        status: "success".into(),
        trip_id,
        trip_code: code,
    })
}

pub async fn join_trip(
    state: &AppState,
    req: &JoinTripRequest,
) -> Result<JoinTripResponse, AppError> {
    let code = trip::normalize_trip_code(&req.trip_code);
    let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE trip_code = ?")
        .bind(&code)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid trip code".into()))?;

    lifecycle::ensure_can_join(&trip)?;

    if is_participant(state, trip.id, req.user_id).await? {
        return Err(AppError::Validation(
            "You have already joined this trip!".into(),
        ));
    }

    sqlx::query(
        "INSERT INTO trip_participants (trip_id, user_id, home_town, budget_range, \
         start_date, end_date, preference_tags) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(trip.id)
    .bind(req.user_id)
    .bind(&req.home_town)
    .bind(&req.budget_range)
    .bind(&req.start_date)
    .bind(&req.end_date)
    .bind(Json(req.preference_tags.clone()))
    .execute(&state.db)
    .await?;

    Ok(JoinTripResponse {
        status: "success".into(),
        trip_id: trip.id,
        trip_name: trip.trip_name,
    })
}

pub async fn trip_detail(state: &AppState, trip_id: i64) -> Result<TripDetailResponse, AppError> {
    let trip = fetch_trip(state, trip_id).await?;
    let participants = fetch_participants(state, trip_id).await?;
    let names = fetch_participant_names(state, trip_id).await?;

    Ok(TripDetailResponse {
        id: trip.id,
        trip_name: trip.trip_name.clone(),
        trip_code: trip.trip_code.clone(),
        leader_id: trip.leader_id,
        is_trip_confirmed: trip.is_trip_confirmed,
        created_at: trip.created_at,
        phase: TripPhase::of(&trip),
        participants: names,
        has_itinerary: trip.has_itinerary(),
        budget_stats: participant::budget_stats(&participants),
        tag_stats: participant::tag_stats(&participants, TAG_STATS_LIMIT),
    })
}

pub async fn lock_trip(
    state: &AppState,
    trip_id: i64,
    user_id: i64,
) -> Result<ActionResponse, AppError> {
    let trip = fetch_trip(state, trip_id).await?;
    lifecycle::ensure_leader(&trip, user_id, "lock")?;

    // Confirmation is monotonic: the first lock flips the flags, repeat
    // locks succeed without writing anything.
    if !trip.is_trip_confirmed {
        sqlx::query("UPDATE trips SET is_trip_confirmed = 1, is_voting_closed = 1 WHERE id = ?")
            .bind(trip_id)
            .execute(&state.db)
            .await?;
        info!(trip_id, "trip locked");
    }

    Ok(ActionResponse::success("Voting closed. Trip confirmed!"))
}

pub async fn delete_trip(
    state: &AppState,
    trip_id: i64,
    user_id: i64,
) -> Result<ActionResponse, AppError> {
    let trip = fetch_trip(state, trip_id).await?;
    lifecycle::ensure_leader(&trip, user_id, "delete")?;

    let mut tx = state.db.begin().await?;
    sqlx::query("DELETE FROM trip_votes WHERE trip_id = ?")
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM trip_participants WHERE trip_id = ?")
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM trips WHERE id = ?")
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    info!(trip_id, "trip deleted");

    Ok(ActionResponse::success("Trip deleted successfully"))
}

pub async fn leave_trip(
    state: &AppState,
    trip_id: i64,
    user_id: i64,
) -> Result<ActionResponse, AppError> {
    let trip = fetch_trip(state, trip_id).await?;
    if trip.is_leader(user_id) {
        return Err(AppError::Validation(
            "Leaders cannot leave. Delete the trip instead.".into(),
        ));
    }

    let result = sqlx::query("DELETE FROM trip_participants WHERE trip_id = ? AND user_id = ?")
        .bind(trip_id)
        .bind(user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::Validation("You are not part of this trip".into()));
    }

    Ok(ActionResponse::success("You have left the trip"))
}

#[derive(sqlx::FromRow)]
struct TravelerRow {
    age: i64,
    gender: String,
    home_town: String,
    budget_range: String,
    start_date: String,
    end_date: String,
    preference_tags: Json<Vec<String>>,
}

pub async fn generate_itinerary(
    state: &AppState,
    trip_id: i64,
    user_id: i64,
) -> Result<GenerateResponse, AppError> {
    let trip = fetch_trip(state, trip_id).await?;
    lifecycle::ensure_leader(&trip, user_id, "generate an itinerary for")?;
    lifecycle::ensure_can_generate(&trip)?;

    let rows = sqlx::query_as::<_, TravelerRow>(
        "SELECT u.age, u.gender, tp.home_town, tp.budget_range, tp.start_date, \
         tp.end_date, tp.preference_tags \
         FROM trip_participants tp JOIN users u ON u.id = tp.user_id \
         WHERE tp.trip_id = ? ORDER BY tp.id",
    )
    .bind(trip_id)
    .fetch_all(&state.db)
    .await?;

    let travelers: Vec<TravelerProfile> = rows
        .into_iter()
        .map(|row| TravelerProfile {
            age: row.age,
            gender: row.gender,
            home_town: row.home_town,
            budget: row.budget_range,
            tags: row.preference_tags.0,
            dates: format!("{} to {}", row.start_date, row.end_date),
        })
        .collect();

    info!(trip_id, travelers = travelers.len(), "generating itinerary");
    let plan = state.recommender.generate_plan(&travelers).await?;

    let stored = serde_json::to_string(&plan)
        .map_err(|err| AppError::Other(anyhow::anyhow!("serialize itinerary: {err}")))?;
    // Guard against a double-submit racing past the phase check above.
    let result =
        sqlx::query("UPDATE trips SET itinerary_data = ? WHERE id = ? AND itinerary_data IS NULL")
            .bind(&stored)
            .bind(trip_id)
            .execute(&state.db)
            .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(
            "An itinerary has already been generated for this trip".into(),
        ));
    }

    Ok(GenerateResponse {
        status: "success".into(),
        data: plan,
    })
}

pub async fn itinerary_state(
    state: &AppState,
    trip_id: i64,
    user_id: Option<i64>,
) -> Result<ItineraryStateResponse, AppError> {
    let trip = fetch_trip(state, trip_id).await?;
    let Some(plan) = trip.plan()? else {
        return Ok(ItineraryStateResponse {
            has_generated: false,
            data: None,
            votes: Default::default(),
            user_vote: None,
            final_choice: None,
        });
    };

    let votes = sqlx::query_as::<_, TripVote>("SELECT * FROM trip_votes WHERE trip_id = ?")
        .bind(trip_id)
        .fetch_all(&state.db)
        .await?;
    let counts = vote::tally(&votes, &plan.option_ids());
    let user_vote = user_id.and_then(|uid| {
        votes
            .iter()
            .find(|v| v.user_id == uid)
            .map(|v| v.option_selected)
    });

    Ok(ItineraryStateResponse {
        has_generated: true,
        data: Some(plan),
        votes: counts,
        user_vote,
        final_choice: trip.final_chosen_option,
    })
}

pub async fn cast_vote(
    state: &AppState,
    trip_id: i64,
    user_id: i64,
    option_id: i64,
) -> Result<VoteResponse, AppError> {
    let trip = fetch_trip(state, trip_id).await?;
    lifecycle::ensure_can_vote(&trip)?;

    if !is_participant(state, trip_id, user_id).await? {
        return Err(AppError::Forbidden("Only trip participants can vote".into()));
    }

    let plan = trip
        .plan()?
        .ok_or_else(|| AppError::Validation("No itinerary to vote on yet".into()))?;
    if plan.option(option_id).is_none() {
        return Err(AppError::Validation("Unknown itinerary option".into()));
    }

    // Last write wins; the unique (trip, user) index keeps it to one row.
    sqlx::query(
        "INSERT INTO trip_votes (trip_id, user_id, option_selected) VALUES (?, ?, ?) \
         ON CONFLICT (trip_id, user_id) DO UPDATE SET option_selected = excluded.option_selected",
    )
    .bind(trip_id)
    .bind(user_id)
    .bind(option_id)
    .execute(&state.db)
    .await?;

    Ok(VoteResponse {
        status: "voted".into(),
    })
}

pub async fn finalize_option(
    state: &AppState,
    trip_id: i64,
    user_id: i64,
    option_id: i64,
) -> Result<FinalizeResponse, AppError> {
    let trip = fetch_trip(state, trip_id).await?;
    lifecycle::ensure_leader(&trip, user_id, "finalize")?;

    match lifecycle::finalize_disposition(&trip, option_id)? {
        FinalizeDisposition::AlreadyFinal => {}
        FinalizeDisposition::Apply => {
            let plan = trip
                .plan()?
                .ok_or_else(|| AppError::Validation("Generate an itinerary before finalizing".into()))?;
            if plan.option(option_id).is_none() {
                return Err(AppError::Validation("Unknown itinerary option".into()));
            }

            let result = sqlx::query(
                "UPDATE trips SET final_chosen_option = ? \
                 WHERE id = ? AND final_chosen_option IS NULL",
            )
            .bind(option_id)
            .bind(trip_id)
            .execute(&state.db)
            .await?;
            if result.rows_affected() == 0 {
                // Raced another finalization; re-read to decide whether it
                // picked the same option.
                let current = fetch_trip(state, trip_id).await?;
                if current.final_chosen_option != Some(option_id) {
                    return Err(AppError::Conflict(
                        "A different option has already been finalized".into(),
                    ));
                }
            } else {
                info!(trip_id, option_id, "itinerary finalized");
            }
        }
    }

    Ok(FinalizeResponse {
        status: "finalized".into(),
    })
}

pub async fn confirmed_details(
    state: &AppState,
    trip_id: i64,
) -> Result<ConfirmedDetailsResponse, AppError> {
    let trip = fetch_trip(state, trip_id).await?;
    if !trip.is_trip_confirmed {
        return Err(AppError::NotFound(
            "Trip not found or not confirmed yet".into(),
        ));
    }

    let chosen = match (trip.plan()?, trip.final_chosen_option) {
        (Some(plan), Some(option_id)) => plan.option(option_id).cloned(),
        _ => None,
    };
    let (location, itinerary) = chosen
        .map(|option| (option.location, option.days))
        .unwrap_or_default();

    let participants = sqlx::query_as::<_, ParticipantRow>(
        "SELECT u.id, u.first_name, u.last_name FROM trip_participants tp \
         JOIN users u ON u.id = tp.user_id WHERE tp.trip_id = ? ORDER BY tp.id",
    )
    .bind(trip_id)
    .fetch_all(&state.db)
    .await?;
    let start_date = sqlx::query_scalar::<_, String>(
        "SELECT start_date FROM trip_participants WHERE trip_id = ? ORDER BY id LIMIT 1",
    )
    .bind(trip_id)
    .fetch_optional(&state.db)
    .await?
    .unwrap_or_default();

    Ok(ConfirmedDetailsResponse {
        id: trip.id,
        trip_name: trip.trip_name,
        trip_code: trip.trip_code,
        location,
        itinerary,
        participants: participants
            .into_iter()
            .map(|row| ParticipantRef {
                id: row.id,
                name: format!("{} {}", row.first_name, row.last_name),
            })
            .collect(),
        start_date,
    })
}

#[derive(sqlx::FromRow)]
struct ParticipantRow {
    id: i64,
    first_name: String,
    last_name: String,
}

pub async fn chat(state: &AppState, trip_id: i64, message: &str) -> Result<ChatResponse, AppError> {
    let trip = fetch_trip(state, trip_id).await?;
    let travelers = fetch_participant_names(state, trip_id).await?;

    let plan = trip.plan()?;
    let final_option = match (&plan, trip.final_chosen_option) {
        (Some(plan), Some(option_id)) => plan.option(option_id).cloned(),
        _ => None,
    };
    let context = ChatContext {
        trip_name: trip.trip_name,
        travelers,
        candidates: if final_option.is_none() { plan } else { None },
        final_option,
    };

    let response = state.recommender.chat_reply(&context, message).await?;
    Ok(ChatResponse { response })
}

pub async fn public_trips(state: &AppState) -> Result<Vec<PublicTripCard>, AppError> {
    let cards = sqlx::query_as::<_, PublicTripCard>(
        "SELECT t.id, t.trip_name, t.trip_code, u.first_name AS leader_name, \
         tp.home_town, tp.start_date, tp.budget_range, tp.preference_tags \
         FROM trips t \
         JOIN users u ON u.id = t.leader_id \
         JOIN trip_participants tp ON tp.trip_id = t.id AND tp.user_id = t.leader_id \
         WHERE t.is_public = 1 AND t.is_trip_confirmed = 0 AND t.is_voting_closed = 0 \
         ORDER BY t.created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(cards)
}
