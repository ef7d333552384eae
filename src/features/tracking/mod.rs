//! Owned records with a status lifecycle.
//!
//! Reports and wastes share ownership, scoping and status handling; each
//! keeps its own status enum and extra columns through [`TrackedResource`].

mod query;
pub(crate) mod record;
mod repository;
mod service;
mod status;

pub use query::RecordListQuery;
pub use record::{ColumnValue, OwnerSummary, TrackedDraft, TrackedRecord, TrackedResource};
pub use repository::{PgTrackedRecordRepository, TrackedRecordRepository};
pub use service::{PatchMode, TrackedRecordService};
pub use status::StatusLifecycle;
