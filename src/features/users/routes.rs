use crate::features::users::handlers;
use crate::features::users::services::UserProfileService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(service: Arc<UserProfileService>) -> Router {
    Router::new()
        .route("/api/profiles/me", get(handlers::get_my_profile))
        .route(
            "/api/profiles",
            get(handlers::list_profiles).post(handlers::create_profile),
        )
        .route(
            "/api/profiles/{id}",
            get(handlers::get_profile)
                .patch(handlers::update_profile)
                .delete(handlers::delete_profile),
        )
        .with_state(service)
}
