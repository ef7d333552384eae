use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::StatusLifecycle;
use crate::core::error::Result;
use crate::features::access::ResourceKind;

/// A kind of owned, status-tracked record (reports, wastes).
///
/// Common columns (`id`, `user_id`, `waste_type`, `location`, `status` and a
/// creation timestamp) are handled generically; everything else lives in
/// [`Details`](TrackedResource::Details).
pub trait TrackedResource: Debug + Clone + Send + Sync + 'static {
    type Status: StatusLifecycle;

    /// Resource-specific columns
    type Details: Debug + Clone + Send + Sync + Unpin + for<'r> FromRow<'r, PgRow>;

    /// Partial update of the resource-specific columns
    type DetailsPatch: Debug + Default + DeserializeOwned + Send;

    const KIND: ResourceKind;

    /// Human-readable name used in messages
    const LABEL: &'static str;

    const TABLE: &'static str;

    const CREATED_AT_COLUMN: &'static str;

    /// Columns backing [`Details`](TrackedResource::Details), in [`detail_values`](TrackedResource::detail_values) order
    const DETAIL_COLUMNS: &'static [&'static str];

    fn detail_values(details: &Self::Details) -> Vec<ColumnValue>;

    /// Validate and apply a patch to the resource-specific columns
    fn apply_patch(details: &mut Self::Details, patch: Self::DetailsPatch) -> Result<()>;
}

/// Owned value bound to a resource-specific column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    OptionalText(Option<String>),
    Float(f64),
}

/// Owner identity embedded in record responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct TrackedRecord<R: TrackedResource> {
    pub id: Uuid,
    /// `None` once the owning identity is gone
    pub owner_id: Option<Uuid>,
    /// Resolved owner; `None` when the owner row is missing
    pub owner: Option<OwnerSummary>,
    pub waste_type: String,
    pub location: String,
    pub status: R::Status,
    pub details: R::Details,
    pub created_at: DateTime<Utc>,
}

/// Expects the projection built by the Postgres repository: common columns,
/// `created_at` alias, detail columns and `owner_username`/`owner_email`
/// from the identity join.
impl<'r, R: TrackedResource> FromRow<'r, PgRow> for TrackedRecord<R> {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let raw_status: String = row.try_get("status")?;
        let status = R::Status::parse(&raw_status).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: format!("unknown {} status '{}'", R::LABEL, raw_status).into(),
        })?;

        let owner_id: Option<Uuid> = row.try_get("user_id")?;
        let owner_username: Option<String> = row.try_get("owner_username")?;
        let owner_email: Option<String> = row.try_get("owner_email")?;
        let owner = match (owner_id, owner_username) {
            (Some(id), Some(username)) => Some(OwnerSummary {
                id,
                username,
                email: owner_email.unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Self {
            id: row.try_get("id")?,
            owner_id,
            owner,
            waste_type: row.try_get("waste_type")?,
            location: row.try_get("location")?,
            status,
            details: R::Details::from_row(row)?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Fields supplied by the creator
#[derive(Debug, Clone)]
pub struct TrackedDraft<R: TrackedResource> {
    pub waste_type: String,
    pub location: String,
    pub details: R::Details,
}

/// Record about to be inserted
#[derive(Debug, Clone)]
pub struct NewTrackedRecord<R: TrackedResource> {
    pub owner_id: Uuid,
    pub waste_type: String,
    pub location: String,
    pub status: R::Status,
    pub details: R::Details,
}

/// Patchable columns shared by every tracked resource
pub const COMMON_PATCH_FIELDS: &[&str] = &["waste_type", "location", "status"];

/// Body of a PATCH request.
///
/// Callers reject keys outside [`COMMON_PATCH_FIELDS`] and the resource's
/// detail columns before deserializing.
#[derive(Debug, Default, Deserialize)]
pub struct RecordPatch<P> {
    #[serde(default)]
    pub waste_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub details: P,
}
