use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Headline figures for the landing screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummaryDto {
    pub total_reports: i64,
    pub pending_reports: i64,
    pub resolved_reports: i64,
    pub waste_types: i64,
}
