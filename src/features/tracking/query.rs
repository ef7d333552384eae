use serde::Deserialize;
use utoipa::IntoParams;

use super::status::StatusLifecycle;
use crate::core::error::Result;
use crate::features::access::{ListFilters, Ordering};
use crate::shared::types::PaginationQuery;

/// Query params for listing reports and wastes
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecordListQuery {
    /// Case-insensitive match on waste type or location
    pub search: Option<String>,
    /// Only records in this status
    pub status: Option<String>,
    /// `created_at` or `status`, prefix with `-` for descending (default: -created_at)
    pub ordering: Option<String>,
    /// Page number (1-indexed, default: 1)
    #[param(minimum = 1)]
    pub page: Option<i64>,
    /// Items per page (default: 20, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
}

impl RecordListQuery {
    /// Parse status and ordering for a resource with status set `S`
    pub fn into_filters<S: StatusLifecycle>(self) -> Result<ListFilters<S>> {
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(S::parse_field)
            .transpose()?;

        let ordering = match self.ordering.as_deref().filter(|o| !o.trim().is_empty()) {
            Some(value) => value.parse::<Ordering>()?,
            None => Ordering::default(),
        };

        let defaults = PaginationQuery::default();
        Ok(ListFilters {
            search: self.search,
            status,
            ordering,
            pagination: PaginationQuery {
                page: self.page.unwrap_or(defaults.page),
                page_size: self.page_size.unwrap_or(defaults.page_size),
            },
        })
    }
}
