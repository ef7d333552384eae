//! Admin-managed catalog of waste types.
//!
//! Reports and wastes refer to a type by its label only.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::WasteTypeService;
