pub mod accounts;
pub mod chat;
pub mod trips;
pub mod users;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(accounts::router())
        .merge(trips::router())
        .merge(chat::router())
        .merge(users::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
