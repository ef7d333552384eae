use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::reports::models::{Report, ReportDetails, ReportResource, ReportStatus};
use crate::features::tracking::{OwnerSummary, TrackedDraft};

/// Request DTO for submitting a report
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    /// Free-text waste type label
    #[validate(length(min = 1, max = 100, message = "Waste type must be 1-100 characters"))]
    pub waste_type: String,

    #[validate(length(min = 1, max = 100, message = "Location must be 1-100 characters"))]
    pub location: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Reference to an already stored image
    #[validate(length(max = 255, message = "Image reference must be at most 255 characters"))]
    #[serde(default)]
    pub image: Option<String>,
}

impl From<CreateReportDto> for TrackedDraft<ReportResource> {
    fn from(dto: CreateReportDto) -> Self {
        Self {
            waste_type: dto.waste_type,
            location: dto.location,
            details: ReportDetails {
                description: dto.description,
                image: dto.image.filter(|i| !i.is_empty()),
            },
        }
    }
}

/// Partial update of a report.
///
/// A body containing only `status` is a status change (officers allowed);
/// any other field requires admin rights.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateReportDto {
    pub waste_type: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub status: Option<ReportStatus>,
}

/// Request DTO for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,
}

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    /// Owner id; `null` once the owner is gone
    pub user: Option<Uuid>,
    pub user_details: Option<OwnerSummary>,
    pub waste_type: String,
    pub location: String,
    pub description: String,
    pub image: Option<String>,
    pub status: ReportStatus,
    pub time_created: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            user: r.owner_id,
            user_details: r.owner,
            waste_type: r.waste_type,
            location: r.location,
            description: r.details.description,
            image: r.details.image,
            status: r.status,
            time_created: r.created_at,
        }
    }
}
