use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    LoginRequestDto, LoginResponseDto, MeResponseDto, RefreshTokenRequestDto, RegisterRequestDto,
    RegisterResponseDto,
};
use crate::features::auth::model::{AuthenticatedUser, Requester, SessionTokens};
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// Register a new account
///
/// Creates the identity and its profile (role defaults to citizen).
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "Account registered successfully", body = ApiResponse<RegisterResponseDto>),
        (status = 400, description = "Field validation errors (password2, role, username, email, ...)")
    ),
    tag = "auth"
)]
pub async fn register(
    requester: Requester,
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponseDto>>)> {
    let registered = service.register(&requester, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(registered),
            Some("Registration successful".to_string()),
            None,
        )),
    ))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponseDto>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    requester: Requester,
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<LoginResponseDto>>> {
    let response = service.login(&requester, dto).await?;
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// End the current session
///
/// Always succeeds, also without a session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out")
    ),
    tag = "auth",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<()>>> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    service.logout_bearer(authorization).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Logged out".to_string()),
        None,
    )))
}

/// Get current authenticated user info
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<MeResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<MeResponseDto>>> {
    let me = service.me(&Requester::Authenticated(user)).await?;
    Ok(Json(ApiResponse::success(Some(me), None, None)))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshTokenRequestDto,
    responses(
        (status = 200, description = "Token refreshed successfully", body = ApiResponse<SessionTokens>),
        (status = 401, description = "Invalid, expired or revoked refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RefreshTokenRequestDto>,
) -> Result<Json<ApiResponse<SessionTokens>>> {
    dto.validate()?;

    let tokens = service.refresh(&dto.refresh).await?;
    Ok(Json(ApiResponse::success(Some(tokens), None, None)))
}
