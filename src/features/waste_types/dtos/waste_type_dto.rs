use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::waste_types::models::{WasteType, WasteTypeFields};
use crate::shared::types::PaginationQuery;

/// Request DTO for creating or replacing a waste type
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct WasteTypeRequestDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

impl From<WasteTypeRequestDto> for WasteTypeFields {
    fn from(dto: WasteTypeRequestDto) -> Self {
        Self {
            name: dto.name.trim().to_string(),
            description: dto.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WasteTypeResponseDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<WasteType> for WasteTypeResponseDto {
    fn from(w: WasteType) -> Self {
        Self {
            id: w.id,
            name: w.name,
            description: w.description,
        }
    }
}

/// Query params for listing waste types
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WasteTypeListQuery {
    /// Case-insensitive match on name
    pub search: Option<String>,
    #[param(minimum = 1)]
    pub page: Option<i64>,
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
}

impl WasteTypeListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        let defaults = PaginationQuery::default();
        PaginationQuery {
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
    }
}
