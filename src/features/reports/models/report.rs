use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};
use crate::features::access::ResourceKind;
use crate::features::tracking::{ColumnValue, StatusLifecycle, TrackedRecord, TrackedResource};

/// Report status; advanced by officers and admins only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
}

impl StatusLifecycle for ReportStatus {
    const ALL: &'static [Self] = &[
        ReportStatus::Pending,
        ReportStatus::InProgress,
        ReportStatus::Resolved,
    ];
    const INITIAL: Self = ReportStatus::Pending;

    fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report-only columns
#[derive(Debug, Clone, FromRow)]
pub struct ReportDetails {
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportPatch {
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit `null` clears the image
    #[serde(default, deserialize_with = "deserialize_present")]
    pub image: Option<Option<String>>,
}

/// Distinguish a present `null` from an absent key
fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone)]
pub struct ReportResource;

impl TrackedResource for ReportResource {
    type Status = ReportStatus;
    type Details = ReportDetails;
    type DetailsPatch = ReportPatch;

    const KIND: ResourceKind = ResourceKind::Report;
    const LABEL: &'static str = "Report";
    const TABLE: &'static str = "reports";
    const CREATED_AT_COLUMN: &'static str = "time_created";
    const DETAIL_COLUMNS: &'static [&'static str] = &["description", "image"];

    fn detail_values(details: &ReportDetails) -> Vec<ColumnValue> {
        vec![
            ColumnValue::Text(details.description.clone()),
            ColumnValue::OptionalText(details.image.clone()),
        ]
    }

    fn apply_patch(details: &mut ReportDetails, patch: ReportPatch) -> Result<()> {
        if let Some(description) = patch.description {
            if description.trim().is_empty() {
                return Err(AppError::field("description", "This field may not be blank."));
            }
            details.description = description;
        }
        if let Some(image) = patch.image {
            details.image = image.filter(|i| !i.is_empty());
        }
        Ok(())
    }
}

pub type Report = TrackedRecord<ReportResource>;
