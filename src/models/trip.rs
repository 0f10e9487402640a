use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::AppError, models::itinerary::ItineraryPlan};

pub const TRIP_CODE_LEN: usize = 6;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: i64,
    pub trip_name: String,
    pub trip_code: String,
    pub leader_id: i64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub voting_deadline: Option<DateTime<Utc>>,
    pub is_voting_closed: bool,
    pub is_trip_confirmed: bool,
    pub itinerary_data: Option<String>,
    pub final_chosen_option: Option<i64>,
}

impl Trip {
    pub fn has_itinerary(&self) -> bool {
        self.itinerary_data.is_some()
    }

    pub fn is_leader(&self, user_id: i64) -> bool {
        self.leader_id == user_id
    }

    /// Stored itinerary data is canonical JSON written by the
    /// normalization step; a parse failure here means the row was
    /// tampered with and is treated as an internal error.
    pub fn plan(&self) -> Result<Option<ItineraryPlan>, AppError> {
        match self.itinerary_data.as_deref() {
            None => Ok(None),
            Some(raw) => {
                let plan = serde_json::from_str(raw).map_err(|err| {
                    AppError::Other(anyhow::anyhow!("stored itinerary is corrupt: {err}"))
                })?;
                Ok(Some(plan))
            }
        }
    }
}

pub fn generate_trip_code(rng: &mut impl Rng) -> String {
    (0..TRIP_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}

/// Join codes are case-insensitive; the canonical form is uppercase.
pub fn normalize_trip_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_use_the_uppercase_alphanumeric_charset() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let code = generate_trip_code(&mut rng);
            assert_eq!(code.len(), TRIP_CODE_LEN);
            assert!(code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn codes_normalize_case_insensitively() {
        assert_eq!(normalize_trip_code("xy782b"), "XY782B");
        assert_eq!(normalize_trip_code("  Xy782B "), "XY782B");
    }
}
