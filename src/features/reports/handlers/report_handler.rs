use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::Requester;
use crate::features::reports::dtos::{
    CreateReportDto, ReportResponseDto, UpdateReportDto, UpdateReportStatusDto,
};
use crate::features::reports::ReportService;
use crate::features::tracking::{PatchMode, RecordListQuery};
use crate::shared::types::{ApiResponse, Meta};

/// List reports visible to the requester
///
/// Citizens see their own reports, officers and admins see all.
/// Anonymous requesters get an empty list.
#[utoipa::path(
    get,
    path = "/api/reports",
    params(RecordListQuery),
    responses(
        (status = 200, description = "List of reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 400, description = "Invalid status or ordering")
    ),
    tag = "reports",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn list_reports(
    requester: Requester,
    State(service): State<Arc<ReportService>>,
    Query(query): Query<RecordListQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let filters = query.into_filters()?;
    let (reports, total) = service.list(&requester, filters).await?;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Submit a new report (citizens and admins)
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report created", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not submit reports")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn create_report(
    requester: Requester,
    State(service): State<Arc<ReportService>>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    dto.validate()?;

    let report = service.create(&requester, dto.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(report.into()),
            Some("Report submitted".to_string()),
            None,
        )),
    ))
}

/// Get a report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn get_report(
    requester: Requester,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.get(&requester, id).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Partially update a report
#[utoipa::path(
    patch,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportDto,
    responses(
        (status = 200, description = "Report updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn update_report(
    requester: Requester,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service
        .patch(&requester, id, payload, PatchMode::Fields)
        .await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Change the status of a report (officers and admins)
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid status or extra fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn update_report_status(
    requester: Requester,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service
        .patch(&requester, id, payload, PatchMode::StatusOnly)
        .await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Delete a report (admin only)
#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn delete_report(
    requester: Requester,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&requester, id).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}
