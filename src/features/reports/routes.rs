use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::reports::handlers;
use crate::features::reports::ReportService;

/// Report routes; the requester may be anonymous, handlers decide
pub fn routes(service: Arc<ReportService>) -> Router {
    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        .route(
            "/api/reports/{id}",
            get(handlers::get_report)
                .patch(handlers::update_report)
                .delete(handlers::delete_report),
        )
        .route(
            "/api/reports/{id}/status",
            patch(handlers::update_report_status),
        )
        .with_state(service)
}
