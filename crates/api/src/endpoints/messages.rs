//! Message and timeline endpoints.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, FixedOffset};
use minitwit_common::AppResult;
use minitwit_core::{CreateMessageInput, FeedEntry};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ok};

/// Feed query parameters.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
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

/// Message in feed responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub content: String,
    pub publish_date: DateTime<FixedOffset>,
    pub author: String,
}

impl From<FeedEntry> for MessageResponse {
    fn from(entry: FeedEntry) -> Self {
        Self {
            content: entry.message.text,
            publish_date: entry.message.published_at,
            author: entry.author.username,
        }
    }
}

/// Post message request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub content: String,
}

/// Get the global public feed.
async fn public_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<MessageResponse>>> {
    let limit = query.no.min(max_limit());
    let entries = state.timeline_service.public_timeline(limit, false).await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Get one user's messages.
async fn user_feed(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<MessageResponse>>> {
    let limit = query.no.min(max_limit());
    let entries = state
        .timeline_service
        .user_timeline(&username, limit, false)
        .await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Post a message as the named user.
async fn post_user_message(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> AppResult<impl IntoResponse> {
    let input = CreateMessageInput { text: req.content };

    state
        .timeline_service
        .create_message(&username, input)
        .await?;

    Ok(ok())
}

/// Post a message as the authenticated user.
async fn post_message(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostMessageRequest>,
) -> AppResult<impl IntoResponse> {
    let input = CreateMessageInput { text: req.content };

    state
        .timeline_service
        .create_message_as(user.id, input)
        .await?;

    Ok(ok())
}

/// Get the authenticated user's personalized feed.
async fn home_feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<MessageResponse>>> {
    let limit = query.no.min(max_limit());
    let entries = state
        .timeline_service
        .home_timeline(user.id, limit, false)
        .await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/msgs", get(public_feed).post(post_message))
        .route("/msgs/{username}", get(user_feed).post(post_user_message))
        .route("/timeline", get(home_feed))
}
