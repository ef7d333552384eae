use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::Profile;
use crate::shared::validation::{blank_to_none, PHONE_REGEX};

/// Profile as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponseDto {
    pub id: Uuid,
    pub identity_id: Uuid,
    /// Stored role text (citizen, officer or admin)
    pub role: String,
    pub phone_number: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponseDto {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            identity_id: profile.identity_id,
            role: profile.role,
            phone_number: profile.phone_number,
            location: profile.location,
            created_at: profile.created_at,
        }
    }
}

/// Request DTO for attaching a profile to an existing identity
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProfileDto {
    pub identity_id: Uuid,

    /// Defaults to citizen
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

impl CreateProfileDto {
    /// Blank optional fields count as not given
    pub fn normalized(self) -> Self {
        Self {
            phone_number: blank_to_none(self.phone_number),
            location: blank_to_none(self.location),
            ..self
        }
    }
}

/// Request DTO for a partial profile update.
///
/// A blank phone number clears the stored one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
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
