//! Follow graph endpoints.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use minitwit_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ok};

/// Follow listing query parameters.
#[derive(Debug, Deserialize)]
pub struct FollowQuery {
    /// Number of entries to return, `no` on the wire.
    #[serde(default = "default_limit")]
    pub no: u64,
}

const fn default_limit() -> u64 {
    20
}

const fn max_limit() -> u64 {
    100
}

/// Usernames the named user follows.
#[derive(Debug, Serialize)]
pub struct FollowsResponse {
    pub follows: Vec<String>,
}

/// Usernames following the named user.
#[derive(Debug, Serialize)]
pub struct FollowersResponse {
    pub followers: Vec<String>,
}

/// Follow mutation request. Exactly one field is expected; `follow`
/// wins when both are present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowChangeRequest {
    pub follow: Option<String>,
    pub unfollow: Option<String>,
}

/// List who the named user follows.
async fn list_follows(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<FollowQuery>,
) -> AppResult<Json<FollowsResponse>> {
    let limit = query.no.min(max_limit());
    let users = state.follow_service.list_following(&username, limit).await?;

    Ok(Json(FollowsResponse {
        follows: users.into_iter().map(|user| user.username).collect(),
    }))
}

/// Follow or unfollow on behalf of the named user.
///
/// The path user is always the actor: `{"follow": X}` makes them follow
/// X, `{"unfollow": Y}` removes one of their edges to Y.
async fn change_follows(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<FollowChangeRequest>,
) -> AppResult<impl IntoResponse> {
    if let Some(whom) = req.follow {
        state.follow_service.follow(&username, &whom).await?;
        return Ok(ok());
    }

    if let Some(whom) = req.unfollow {
        state.follow_service.unfollow(&whom, &username).await?;
        return Ok(ok());
    }

    Err(AppError::BadRequest(
        "Neither the user to follow nor to unfollow was specified".to_string(),
    ))
}

/// List who follows the named user.
async fn list_followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<FollowQuery>,
) -> AppResult<Json<FollowersResponse>> {
    let limit = query.no.min(max_limit());
    let users = state.follow_service.list_followers(&username, limit).await?;

    Ok(Json(FollowersResponse {
        followers: users.into_iter().map(|user| user.username).collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fllws/{username}", get(list_follows).post(change_follows))
        .route("/followers/{username}", get(list_followers))
}
