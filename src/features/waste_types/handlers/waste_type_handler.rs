use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::Requester;
use crate::features::waste_types::dtos::{
    WasteTypeListQuery, WasteTypeRequestDto, WasteTypeResponseDto,
};
use crate::features::waste_types::services::WasteTypeService;
use crate::shared::types::{ApiResponse, Meta};

/// List waste types (public)
#[utoipa::path(
    get,
    path = "/api/waste-types",
    params(WasteTypeListQuery),
    responses(
        (status = 200, description = "List of waste types", body = ApiResponse<Vec<WasteTypeResponseDto>>)
    ),
    tag = "waste-types"
)]
pub async fn list_waste_types(
    requester: Requester,
    State(service): State<Arc<WasteTypeService>>,
    Query(query): Query<WasteTypeListQuery>,
) -> Result<Json<ApiResponse<Vec<WasteTypeResponseDto>>>> {
    let (items, total) = service
        .list(&requester, query.search.as_deref(), &query.pagination())
        .await?;
    let dtos = items.into_iter().map(WasteTypeResponseDto::from).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get a waste type by ID (public)
#[utoipa::path(
    get,
    path = "/api/waste-types/{id}",
    params(
        ("id" = Uuid, Path, description = "Waste type ID")
    ),
    responses(
        (status = 200, description = "Waste type found", body = ApiResponse<WasteTypeResponseDto>),
        (status = 404, description = "Waste type not found")
    ),
    tag = "waste-types"
)]
pub async fn get_waste_type(
    requester: Requester,
    State(service): State<Arc<WasteTypeService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WasteTypeResponseDto>>> {
    let waste_type = service.get(&requester, id).await?;
    Ok(Json(ApiResponse::success(Some(waste_type.into()), None, None)))
}

/// Add a waste type (admin only)
#[utoipa::path(
    post,
    path = "/api/waste-types",
    request_body = WasteTypeRequestDto,
    responses(
        (status = 201, description = "Waste type created", body = ApiResponse<WasteTypeResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "waste-types",
    security(("bearer_auth" = []))
)]
pub async fn create_waste_type(
    requester: Requester,
    State(service): State<Arc<WasteTypeService>>,
    AppJson(dto): AppJson<WasteTypeRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<WasteTypeResponseDto>>)> {
    dto.validate()?;

    let created = service.create(&requester, dto.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(created.into()), None, None)),
    ))
}

/// Replace a waste type (admin only)
#[utoipa::path(
    put,
    path = "/api/waste-types/{id}",
    params(
        ("id" = Uuid, Path, description = "Waste type ID")
    ),
    request_body = WasteTypeRequestDto,
    responses(
        (status = 200, description = "Waste type updated", body = ApiResponse<WasteTypeResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Waste type not found")
    ),
    tag = "waste-types",
    security(("bearer_auth" = []))
)]
pub async fn update_waste_type(
    requester: Requester,
    State(service): State<Arc<WasteTypeService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<WasteTypeRequestDto>,
) -> Result<Json<ApiResponse<WasteTypeResponseDto>>> {
    dto.validate()?;

    let updated = service.update(&requester, id, dto.into()).await?;
    Ok(Json(ApiResponse::success(Some(updated.into()), None, None)))
}

/// Delete a waste type (admin only)
#[utoipa::path(
    delete,
    path = "/api/waste-types/{id}",
    params(
        ("id" = Uuid, Path, description = "Waste type ID")
    ),
    responses(
        (status = 200, description = "Waste type deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Waste type not found")
    ),
    tag = "waste-types",
    security(("bearer_auth" = []))
)]
pub async fn delete_waste_type(
    requester: Requester,
    State(service): State<Arc<WasteTypeService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&requester, id).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}
