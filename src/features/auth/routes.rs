use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Auth routes; `me` rejects anonymous requesters, everything else accepts them
pub fn routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/refresh", post(handlers::refresh_token))
        .route("/api/auth/me", get(handlers::get_me))
        .with_state(service)
}

/// Logout resolves its own bearer token so stale sessions still succeed.
/// Mounted outside `identify_requester`.
pub fn session_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/logout", post(handlers::logout))
        .with_state(service)
}
