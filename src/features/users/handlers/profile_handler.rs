use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::{AuthenticatedUser, Requester};
use crate::features::users::dtos::{CreateProfileDto, ProfileResponseDto, UpdateProfileDto};
use crate::features::users::services::UserProfileService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Get the caller's own profile
#[utoipa::path(
    get,
    path = "/api/profiles/me",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No profile exists yet")
    ),
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_my_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<UserProfileService>>,
) -> Result<Json<ApiResponse<ProfileResponseDto>>> {
    let profile = service.me(&Requester::Authenticated(user)).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// List profiles (admin only)
#[utoipa::path(
    get,
    path = "/api/profiles",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of profiles", body = ApiResponse<Vec<ProfileResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_profiles(
    requester: Requester,
    State(service): State<Arc<UserProfileService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ProfileResponseDto>>>> {
    let (profiles, total) = service.list(&requester, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(profiles),
        None,
        Some(Meta { total }),
    )))
}

/// Attach a profile to an existing identity (admin only)
#[utoipa::path(
    post,
    path = "/api/profiles",
    request_body = CreateProfileDto,
    responses(
        (status = 201, description = "Profile created", body = ApiResponse<ProfileResponseDto>),
        (status = 400, description = "Unknown identity, duplicate profile or invalid role"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_profile(
    requester: Requester,
    State(service): State<Arc<UserProfileService>>,
    AppJson(dto): AppJson<CreateProfileDto>,
) -> Result<(StatusCode, Json<ApiResponse<ProfileResponseDto>>)> {
    let dto = dto.normalized();
    dto.validate()?;

    let profile = service.create(&requester, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(profile), None, None)),
    ))
}

/// Get a profile by ID
///
/// Admins may read any profile, everyone else only their own.
#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    params(
        ("id" = Uuid, Path, description = "Profile ID")
    ),
    responses(
        (status = 200, description = "Profile found", body = ApiResponse<ProfileResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Profile not found")
    ),
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_profile(
    requester: Requester,
    State(service): State<Arc<UserProfileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProfileResponseDto>>> {
    let profile = service.get(&requester, id).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// Update role, phone number or location (admin only)
#[utoipa::path(
    patch,
    path = "/api/profiles/{id}",
    params(
        ("id" = Uuid, Path, description = "Profile ID")
    ),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<ProfileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Profile not found")
    ),
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_profile(
    requester: Requester,
    State(service): State<Arc<UserProfileService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateProfileDto>,
) -> Result<Json<ApiResponse<ProfileResponseDto>>> {
    dto.validate()?;

    let profile = service.update(&requester, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("Profile updated successfully".to_string()),
        None,
    )))
}

/// Delete a profile (admin only)
#[utoipa::path(
    delete,
    path = "/api/profiles/{id}",
    params(
        ("id" = Uuid, Path, description = "Profile ID")
    ),
    responses(
        (status = 200, description = "Profile deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Profile not found")
    ),
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_profile(
    requester: Requester,
    State(service): State<Arc<UserProfileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&requester, id).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}
