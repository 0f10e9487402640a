#![allow(dead_code)]

use std::{fmt, net::SocketAddr, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use tempfile::TempDir;
use tripcrew::{
    config::AppConfig,
    db::init_pool,
    error::AppError,
    models::itinerary::ItineraryPlan,
    services::recommend::{ChatContext, Recommender, TravelerProfile},
    state::AppState,
};

/// Canned generator output, deliberately heterogeneous: option 2 has no
/// id, one day uses `day_number` with an activity list, and the last day
/// has no index at all. The normalization boundary has to absorb all of
/// it.
pub const PLAN_JSON: &str = r#"{
    "analysis_summary": "Coastal crew, mid-range budgets, short dates.",
    "options": [
        {
            "id": 1,
            "title": "Gokarna Beach Hop",
            "location": "Gokarna, Karnataka",
            "total_estimated_cost": "11,000 per person",
            "vibe_match": "Beach & Chill",
            "why_its_perfect": "Fits the majority budget and the beach tags.",
            "itinerary": [
                { "day": 1, "activity": "Om beach sunset" },
                { "day": 2, "activity": "Kudle beach cafes" }
            ]
        },
        {
            "title": "Chikmagalur Coffee Trails",
            "location": "Chikmagalur, Karnataka",
            "total_estimated_cost": "13,500 per person",
            "vibe_match": "Hills & Coffee",
            "why_its_perfect": "A quieter wildcard within the same budget.",
            "itinerary": [
                { "day_number": 1, "activities": ["Estate walk", "Tasting session"] },
                { "activity": "Mullayanagiri trek" }
            ]
        }
    ]
}"#;

pub struct CannedRecommender;

#[async_trait]
impl Recommender for CannedRecommender {
    async fn generate_plan(
        &self,
        _travelers: &[TravelerProfile],
    ) -> Result<ItineraryPlan, AppError> {
        ItineraryPlan::parse(PLAN_JSON)
    }

    async fn chat_reply(&self, context: &ChatContext, message: &str) -> Result<String, AppError> {
        Ok(format!("About \"{}\": {}", context.trip_name, message))
    }
}

pub struct FailingRecommender;

#[async_trait]
impl Recommender for FailingRecommender {
    async fn generate_plan(
        &self,
        _travelers: &[TravelerProfile],
    ) -> Result<ItineraryPlan, AppError> {
        Err(AppError::Upstream("generator offline".into()))
    }

    async fn chat_reply(&self, _context: &ChatContext, _message: &str) -> Result<String, AppError> {
        Err(AppError::Upstream("generator offline".into()))
    }
}

pub struct TestApp {
    pub state: AppState,
    _root: TempDir,
}

impl fmt::Debug for TestApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestApp").finish()
    }
}

pub async fn test_app() -> anyhow::Result<TestApp> {
    test_app_with(Arc::new(CannedRecommender)).await
}

pub async fn test_app_with(recommender: Arc<dyn Recommender>) -> anyhow::Result<TestApp> {
    let root = TempDir::new().context("create temp dir for test app")?;
    let db_path = root.path().join("test.sqlite");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy());

    let config = AppConfig {
        database_url: database_url.clone(),
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        gemini_api_key: String::new(),
        gemini_model: "gemini-2.5-flash".into(),
        gemini_base_url: "http://127.0.0.1:0".into(),
    };

    let db = init_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    Ok(TestApp {
        state: AppState::new(config, db, recommender),
        _root: root,
    })
}
