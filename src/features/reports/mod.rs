//! Citizen-submitted waste reports.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;

use crate::features::tracking::TrackedRecordService;

pub use models::ReportResource;

pub type ReportService = TrackedRecordService<ReportResource>;
