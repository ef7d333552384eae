use std::sync::Arc;

use crate::core::error::Result;
use crate::features::access::{AccessService, Action, ResourceKind};
use crate::features::auth::model::Requester;
use crate::features::dashboard::dtos::DashboardSummaryDto;
use crate::features::reports::models::ReportStatus;
use crate::features::reports::ReportService;
use crate::features::waste_types::WasteTypeService;

/// Aggregate statistics for signed-in users
pub struct DashboardService {
    reports: Arc<ReportService>,
    waste_types: Arc<WasteTypeService>,
    access: Arc<AccessService>,
}

impl DashboardService {
    pub fn new(
        reports: Arc<ReportService>,
        waste_types: Arc<WasteTypeService>,
        access: Arc<AccessService>,
    ) -> Self {
        Self {
            reports,
            waste_types,
            access,
        }
    }

    /// Counts cover all records regardless of who is asking
    pub async fn get_summary(&self, requester: &Requester) -> Result<DashboardSummaryDto> {
        let principal = self.access.resolve(requester).await;
        self.access
            .enforce(&principal, Action::Retrieve, ResourceKind::Dashboard, None)?;

        let (total_reports, pending_reports, resolved_reports, waste_types) = tokio::try_join!(
            self.reports.count(None),
            self.reports.count(Some(ReportStatus::Pending)),
            self.reports.count(Some(ReportStatus::Resolved)),
            self.waste_types.count(),
        )?;

        Ok(DashboardSummaryDto {
            total_reports,
            pending_reports,
            resolved_reports,
            waste_types,
        })
    }
}
