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
use crate::features::wastes::dtos::{
    CreateWasteDto, UpdateWasteDto, UpdateWasteStatusDto, WasteResponseDto,
};
use crate::features::wastes::WasteService;
use crate::features::tracking::{PatchMode, RecordListQuery};
use crate::shared::types::{ApiResponse, Meta};

/// List waste records visible to the requester
///
/// Citizens see what they recorded, officers and admins see everything.
#[utoipa::path(
    get,
    path = "/api/wastes",
    params(RecordListQuery),
    responses(
        (status = 200, description = "List of waste records", body = ApiResponse<Vec<WasteResponseDto>>),
        (status = 400, description = "Invalid status or ordering")
    ),
    tag = "wastes",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn list_wastes(
    requester: Requester,
    State(service): State<Arc<WasteService>>,
    Query(query): Query<RecordListQuery>,
) -> Result<Json<ApiResponse<Vec<WasteResponseDto>>>> {
    let filters = query.into_filters()?;
    let (wastes, total) = service.list(&requester, filters).await?;
    let dtos = wastes.into_iter().map(WasteResponseDto::from).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Record collected waste (any authenticated user)
#[utoipa::path(
    post,
    path = "/api/wastes",
    request_body = CreateWasteDto,
    responses(
        (status = 201, description = "Waste recorded", body = ApiResponse<WasteResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "wastes",
    security(("bearer_auth" = []))
)]
pub async fn create_waste(
    requester: Requester,
    State(service): State<Arc<WasteService>>,
    AppJson(dto): AppJson<CreateWasteDto>,
) -> Result<(StatusCode, Json<ApiResponse<WasteResponseDto>>)> {
    dto.validate()?;

    let waste = service.create(&requester, dto.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(waste.into()),
            Some("Waste recorded".to_string()),
            None,
        )),
    ))
}

/// Get a waste record by ID
#[utoipa::path(
    get,
    path = "/api/wastes/{id}",
    params(
        ("id" = Uuid, Path, description = "Waste ID")
    ),
    responses(
        (status = 200, description = "Waste record found", body = ApiResponse<WasteResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Waste record not found")
    ),
    tag = "wastes",
    security(("bearer_auth" = []))
)]
pub async fn get_waste(
    requester: Requester,
    State(service): State<Arc<WasteService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WasteResponseDto>>> {
    let waste = service.get(&requester, id).await?;
    Ok(Json(ApiResponse::success(Some(waste.into()), None, None)))
}

/// Partially update a waste record
#[utoipa::path(
    patch,
    path = "/api/wastes/{id}",
    params(
        ("id" = Uuid, Path, description = "Waste ID")
    ),
    request_body = UpdateWasteDto,
    responses(
        (status = 200, description = "Waste record updated", body = ApiResponse<WasteResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Waste record not found")
    ),
    tag = "wastes",
    security(("bearer_auth" = []))
)]
pub async fn update_waste(
    requester: Requester,
    State(service): State<Arc<WasteService>>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<Json<ApiResponse<WasteResponseDto>>> {
    let waste = service
        .patch(&requester, id, payload, PatchMode::Fields)
        .await?;
    Ok(Json(ApiResponse::success(Some(waste.into()), None, None)))
}

/// Change the collection status (officers and admins)
#[utoipa::path(
    patch,
    path = "/api/wastes/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Waste ID")
    ),
    request_body = UpdateWasteStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<WasteResponseDto>),
        (status = 400, description = "Invalid status or extra fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Waste record not found")
    ),
    tag = "wastes",
    security(("bearer_auth" = []))
)]
pub async fn update_waste_status(
    requester: Requester,
    State(service): State<Arc<WasteService>>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<Map<String, Value>>,
) -> Result<Json<ApiResponse<WasteResponseDto>>> {
    let waste = service
        .patch(&requester, id, payload, PatchMode::StatusOnly)
        .await?;
    Ok(Json(ApiResponse::success(Some(waste.into()), None, None)))
}

/// Delete a waste record (admin only)
#[utoipa::path(
    delete,
    path = "/api/wastes/{id}",
    params(
        ("id" = Uuid, Path, description = "Waste ID")
    ),
    responses(
        (status = 200, description = "Waste record deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Waste record not found")
    ),
    tag = "wastes",
    security(("bearer_auth" = []))
)]
pub async fn delete_waste(
    requester: Requester,
    State(service): State<Arc<WasteService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&requester, id).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}
