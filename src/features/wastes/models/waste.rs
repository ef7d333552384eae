use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};
use crate::features::access::ResourceKind;
use crate::features::tracking::{ColumnValue, StatusLifecycle, TrackedRecord, TrackedResource};

/// Collection status of a waste record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WasteStatus {
    Pending,
    Collected,
    Processed,
}

impl StatusLifecycle for WasteStatus {
    const ALL: &'static [Self] = &[
        WasteStatus::Pending,
        WasteStatus::Collected,
        WasteStatus::Processed,
    ];
    const INITIAL: Self = WasteStatus::Pending;

    fn as_str(&self) -> &'static str {
        match self {
            WasteStatus::Pending => "pending",
            WasteStatus::Collected => "collected",
            WasteStatus::Processed => "processed",
        }
    }
}

impl std::fmt::Display for WasteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct WasteDetails {
    pub quantity: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct WastePatch {
    #[serde(default)]
    pub quantity: Option<f64>,
}

fn check_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(AppError::field(
            "quantity",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct WasteResource;

impl TrackedResource for WasteResource {
    type Status = WasteStatus;
    type Details = WasteDetails;
    type DetailsPatch = WastePatch;

    const KIND: ResourceKind = ResourceKind::Waste;
    const LABEL: &'static str = "Waste";
    const TABLE: &'static str = "wastes";
    const CREATED_AT_COLUMN: &'static str = "created_at";
    const DETAIL_COLUMNS: &'static [&'static str] = &["quantity"];

    fn detail_values(details: &WasteDetails) -> Vec<ColumnValue> {
        vec![ColumnValue::Float(details.quantity)]
    }

    fn apply_patch(details: &mut WasteDetails, patch: WastePatch) -> Result<()> {
        if let Some(quantity) = patch.quantity {
            check_quantity(quantity)?;
            details.quantity = quantity;
        }
        Ok(())
    }
}

pub type Waste = TrackedRecord<WasteResource>;
