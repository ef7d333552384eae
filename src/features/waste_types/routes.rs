use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::waste_types::handlers;
use crate::features::waste_types::services::WasteTypeService;

pub fn routes(service: Arc<WasteTypeService>) -> Router {
    Router::new()
        .route(
            "/api/waste-types",
            get(handlers::list_waste_types).post(handlers::create_waste_type),
        )
        .route(
            "/api/waste-types/{id}",
            get(handlers::get_waste_type)
                .put(handlers::update_waste_type)
                .delete(handlers::delete_waste_type),
        )
        .with_state(service)
}
