use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::tracking::{OwnerSummary, TrackedDraft};
use crate::features::wastes::models::{Waste, WasteDetails, WasteResource, WasteStatus};

/// Request DTO for recording collected waste
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateWasteDto {
    #[validate(length(min = 1, max = 100, message = "Waste type must be 1-100 characters"))]
    pub waste_type: String,

    /// Amount in the unit agreed for the waste type, never negative
    #[validate(range(min = 0.0, message = "Quantity must be greater than or equal to 0"))]
    pub quantity: f64,

    #[validate(length(min = 1, max = 100, message = "Location must be 1-100 characters"))]
    pub location: String,
}

impl From<CreateWasteDto> for TrackedDraft<WasteResource> {
    fn from(dto: CreateWasteDto) -> Self {
        Self {
            waste_type: dto.waste_type,
            location: dto.location,
            details: WasteDetails {
                quantity: dto.quantity,
            },
        }
    }
}

/// Partial update of a waste record.
///
/// A body containing only `status` is a status change (officers allowed);
/// any other field requires admin rights.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateWasteDto {
    pub waste_type: Option<String>,
    pub quantity: Option<f64>,
    pub location: Option<String>,
    pub status: Option<WasteStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateWasteStatusDto {
    pub status: WasteStatus,
}

/// Response DTO for waste
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WasteResponseDto {
    pub id: Uuid,
    pub user: Option<Uuid>,
    pub user_details: Option<OwnerSummary>,
    pub waste_type: String,
    pub quantity: f64,
    pub location: String,
    pub status: WasteStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Waste> for WasteResponseDto {
    fn from(w: Waste) -> Self {
        Self {
            id: w.id,
            user: w.owner_id,
            user_details: w.owner,
            waste_type: w.waste_type,
            quantity: w.details.quantity,
            location: w.location,
            status: w.status,
            created_at: w.created_at,
        }
    }
}
