//! HTTP API layer for minitwit.
//!
//! This crate provides the JSON REST API:
//!
//! - **Endpoints**: registration, login, messages, follows, timelines
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: token resolution, shared application state
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
