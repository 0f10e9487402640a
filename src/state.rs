use std::sync::Arc;

use crate::{config::AppConfig, db::DbPool, services::recommend::Recommender};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub recommender: Arc<dyn Recommender>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool, recommender: Arc<dyn Recommender>) -> Self {
        Self {
            config,
            db,
            recommender,
        }
    }
}
