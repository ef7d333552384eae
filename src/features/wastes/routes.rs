use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::wastes::handlers;
use crate::features::wastes::WasteService;

pub fn routes(service: Arc<WasteService>) -> Router {
    Router::new()
        .route(
            "/api/wastes",
            get(handlers::list_wastes).post(handlers::create_waste),
        )
        .route(
            "/api/wastes/{id}",
            get(handlers::get_waste)
                .patch(handlers::update_waste)
                .delete(handlers::delete_waste),
        )
        .route(
            "/api/wastes/{id}/status",
            patch(handlers::update_waste_status),
        )
        .with_state(service)
}
