use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse},
        extractors::Principal,
        jwt::JwtKeys,
        services::{login_user, register_user},
    },
    error::AppError,
    extract::ValidJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/testAPI", get(test_api))
        .route("/api/user/register", post(register))
        .route("/api/user/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/api/user/me", get(get_me))
}

pub async fn test_api() -> Json<Value> {
    Json(json!({ "message": "Test API is working." }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = register_user(state.users.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            msg: "Success",
            saved_object: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let (user, token) = login_user(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(LoginResponse {
        success: true,
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn get_me(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .users
        .find_by_id(principal.id)
        .await?
        .ok_or(AppError::Unauthenticated("User not found"))?;
    Ok(Json(user.into()))
}
