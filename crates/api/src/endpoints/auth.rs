//! Authentication endpoints.

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use minitwit_common::AppResult;
use minitwit_core::CreateUserInput;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ok};

/// Registration request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Register a new user account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let input = CreateUserInput {
        username: req.username,
        email: req.email,
        password: req.password,
    };

    state.user_service.create(input).await?;

    Ok(ok())
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: i64,
    pub username: String,
    pub token: String,
}

/// Log in to an existing account.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (user, token) = state
        .user_service
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(LoginResponse {
        id: user.id,
        username: user.username,
        token,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
