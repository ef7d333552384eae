//! Collected waste records.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;

use crate::features::tracking::TrackedRecordService;

pub use models::WasteResource;

pub type WasteService = TrackedRecordService<WasteResource>;
