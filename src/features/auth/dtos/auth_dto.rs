use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::model::{Identity, SessionTokens};
use crate::features::users::models::Role;
use crate::shared::constants::{PASSWORD_MIN_LENGTH, USERNAME_MAX_LENGTH};
use crate::shared::validation::{blank_to_none, PHONE_REGEX, USERNAME_REGEX};

/// Request DTO for account registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(
        length(min = 1, max = USERNAME_MAX_LENGTH, message = "Username must be 1-150 characters"),
        regex(path = *USERNAME_REGEX, message = "Username may contain only letters, digits and @/./+/-/_")
    )]
    pub username: String,

    /// Optional; must be unique when given
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    #[serde(default)]
    pub email: Option<String>,

    #[validate(length(min = PASSWORD_MIN_LENGTH, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Must repeat `password`
    pub password2: String,

    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    #[serde(default)]
    pub first_name: Option<String>,

    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    #[serde(default)]
    pub last_name: Option<String>,

    /// One of citizen, officer, admin (default citizen)
    #[serde(default)]
    pub role: Option<String>,

    #[validate(
        length(max = 20, message = "Phone number must be at most 20 characters"),
        regex(path = *PHONE_REGEX, message = "Enter a valid phone number")
    )]
    #[serde(default)]
    pub phone_number: Option<String>,

    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    #[serde(default)]
    pub location: Option<String>,
}

impl RegisterRequestDto {
    /// Blank optional fields count as not given
    pub fn normalized(self) -> Self {
        Self {
            email: blank_to_none(self.email),
            phone_number: blank_to_none(self.phone_number),
            location: blank_to_none(self.location),
            ..self
        }
    }
}

/// Response DTO for registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponseDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Request DTO for login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request DTO for token refresh
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequestDto {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh: String,
}

/// Identity fields safe to expose
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummaryDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
    pub is_staff: bool,
}

impl From<&Identity> for UserSummaryDto {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            is_superuser: identity.is_superuser,
            is_staff: identity.is_staff,
        }
    }
}

/// Response DTO for login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    pub user: UserSummaryDto,
    /// Effective role after profile reconciliation; `null` when the stored role is not recognised
    pub role: Option<Role>,
    pub tokens: SessionTokens,
}

/// Response DTO for the current requester
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub user: UserSummaryDto,
    /// Effective role; `null` when the stored role is not recognised
    pub role: Option<Role>,
}
