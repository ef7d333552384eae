use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::model::Requester;
use crate::features::dashboard::dtos::DashboardSummaryDto;
use crate::features::dashboard::services::DashboardService;
use crate::shared::types::ApiResponse;

/// Get report and catalog totals
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = ApiResponse<DashboardSummaryDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_summary(
    requester: Requester,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<DashboardSummaryDto>>> {
    let summary = service.get_summary(&requester).await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}
