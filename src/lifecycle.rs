//! Trip lifecycle state machine.
//!
//! A trip moves through `Voting -> Locked -> ItineraryGenerated ->
//! Finalized`, and never backwards: confirmation is monotonic and the
//! final choice is write-once. The phase is derived from the trip record
//! rather than stored, so it cannot disagree with the flags, and every
//! mutating operation runs through the guards below before touching the
//! database.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::trip::Trip};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripPhase {
    Voting,
    Locked,
    ItineraryGenerated,
    Finalized,
}

impl TripPhase {
    pub fn of(trip: &Trip) -> Self {
        if trip.final_chosen_option.is_some() {
            return TripPhase::Finalized;
        }
        if trip.has_itinerary() {
            return TripPhase::ItineraryGenerated;
        }
        if trip.is_trip_confirmed || trip.is_voting_closed {
            return TripPhase::Locked;
        }
        TripPhase::Voting
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TripPhase::Voting => "voting",
            TripPhase::Locked => "locked",
            TripPhase::ItineraryGenerated => "itinerary_generated",
            TripPhase::Finalized => "finalized",
        }
    }
}

impl fmt::Display for TripPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Leader-only actions are 403 for everyone else, regardless of phase.
pub fn ensure_leader(trip: &Trip, user_id: i64, action: &str) -> Result<(), AppError> {
    if trip.is_leader(user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Only the trip leader can {action} this trip"
        )))
    }
}

/// Joining is only open while the trip is still collecting participants.
pub fn ensure_can_join(trip: &Trip) -> Result<(), AppError> {
    match TripPhase::of(trip) {
        TripPhase::Voting => Ok(()),
        _ => Err(AppError::Validation(
            "Voting is closed! You cannot join this trip anymore.".into(),
        )),
    }
}

/// Generation requires a locked trip with no itinerary yet.
pub fn ensure_can_generate(trip: &Trip) -> Result<(), AppError> {
    match TripPhase::of(trip) {
        TripPhase::Locked => Ok(()),
        TripPhase::Voting => Err(AppError::Validation(
            "Lock the trip before generating an itinerary".into(),
        )),
        TripPhase::ItineraryGenerated | TripPhase::Finalized => Err(AppError::Conflict(
            "An itinerary has already been generated for this trip".into(),
        )),
    }
}

/// Votes are accepted only between generation and finalization. A vote
/// that races a finalization still gets rejected here, and the client
/// treats that rejection as authoritative.
pub fn ensure_can_vote(trip: &Trip) -> Result<(), AppError> {
    match TripPhase::of(trip) {
        TripPhase::ItineraryGenerated => Ok(()),
        TripPhase::Finalized => Err(AppError::Conflict(
            "Voting is closed; an option has already been finalized".into(),
        )),
        TripPhase::Voting | TripPhase::Locked => Err(AppError::Validation(
            "No itinerary to vote on yet".into(),
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeDisposition {
    /// No final choice yet; write it.
    Apply,
    /// The same option is already final; report success without writing.
    AlreadyFinal,
}

/// The final choice is write-once: re-finalizing the same option is a
/// no-op, any other option is a conflict.
pub fn finalize_disposition(trip: &Trip, option_id: i64) -> Result<FinalizeDisposition, AppError> {
    match trip.final_chosen_option {
        Some(existing) if existing == option_id => Ok(FinalizeDisposition::AlreadyFinal),
        Some(_) => Err(AppError::Conflict(
            "A different option has already been finalized".into(),
        )),
        None => match TripPhase::of(trip) {
            TripPhase::ItineraryGenerated => Ok(FinalizeDisposition::Apply),
            _ => Err(AppError::Validation(
                "Generate an itinerary before finalizing".into(),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn trip() -> Trip {
        Trip {
            id: 1,
            trip_name: "Goa Getaway".into(),
            trip_code: "XY782B".into(),
            leader_id: 7,
            is_public: false,
            created_at: Utc::now(),
            voting_deadline: None,
            is_voting_closed: false,
            is_trip_confirmed: false,
            itinerary_data: None,
            final_chosen_option: None,
        }
    }

    fn locked() -> Trip {
        let mut t = trip();
        t.is_trip_confirmed = true;
        t.is_voting_closed = true;
        t
    }

    fn generated() -> Trip {
        let mut t = locked();
        t.itinerary_data = Some("{\"options\":[]}".into());
        t
    }

    fn finalized() -> Trip {
        let mut t = generated();
        t.final_chosen_option = Some(1);
        t
    }

    #[test]
    fn phase_is_derived_from_the_record() {
        assert_eq!(TripPhase::of(&trip()), TripPhase::Voting);
        assert_eq!(TripPhase::of(&locked()), TripPhase::Locked);
        assert_eq!(TripPhase::of(&generated()), TripPhase::ItineraryGenerated);
        assert_eq!(TripPhase::of(&finalized()), TripPhase::Finalized);
    }

    #[test]
    fn phase_serializes_snake_case() {
        let phase = serde_json::to_value(TripPhase::ItineraryGenerated).unwrap();
        assert_eq!(phase, serde_json::json!("itinerary_generated"));
        assert_eq!(TripPhase::Finalized.as_str(), "finalized");
    }

    #[test]
    fn only_the_leader_passes_the_leader_guard() {
        assert!(ensure_leader(&trip(), 7, "lock").is_ok());
        let err = ensure_leader(&trip(), 8, "lock").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn joining_is_rejected_from_locked_onwards() {
        assert!(ensure_can_join(&trip()).is_ok());
        for t in [locked(), generated(), finalized()] {
            assert!(matches!(
                ensure_can_join(&t),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn generation_needs_a_locked_trip_without_a_plan() {
        assert!(matches!(
            ensure_can_generate(&trip()),
            Err(AppError::Validation(_))
        ));
        assert!(ensure_can_generate(&locked()).is_ok());
        assert!(matches!(
            ensure_can_generate(&generated()),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            ensure_can_generate(&finalized()),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn votes_are_only_accepted_between_generation_and_finalization() {
        assert!(matches!(
            ensure_can_vote(&trip()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ensure_can_vote(&locked()),
            Err(AppError::Validation(_))
        ));
        assert!(ensure_can_vote(&generated()).is_ok());
        assert!(matches!(
            ensure_can_vote(&finalized()),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn finalization_is_write_once_and_idempotent() {
        assert_eq!(
            finalize_disposition(&generated(), 1).unwrap(),
            FinalizeDisposition::Apply
        );
        assert_eq!(
            finalize_disposition(&finalized(), 1).unwrap(),
            FinalizeDisposition::AlreadyFinal
        );
        assert!(matches!(
            finalize_disposition(&finalized(), 2),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            finalize_disposition(&locked(), 1),
            Err(AppError::Validation(_))
        ));
    }
}
