//! API endpoints.

mod auth;
mod follows;
mod messages;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(messages::router())
        .merge(follows::router())
}
