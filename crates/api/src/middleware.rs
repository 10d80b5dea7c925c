//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use minitwit_core::{FollowService, TimelineService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub follow_service: FollowService,
    pub timeline_service: TimelineService,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to its user and stores the user in the
/// request extensions; handlers opt in through the `AuthUser` extractor.
/// Requests without a valid token pass through unauthenticated.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        if let Ok(user) = state.user_service.authenticate_by_token(token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
