use axum::{extract::State, routing::post, Json, Router};

use crate::{
    auth,
    error::AppError,
    models::wire::{LoginRequest, LoginResponse, SignupRequest, UserResponse},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = auth::register_user(&state, &req).await?;
    Ok(Json(UserResponse::from(&user)))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = auth::authenticate_user(&state, &req.email, &req.password).await?;
    Ok(Json(LoginResponse::from(&user)))
}
