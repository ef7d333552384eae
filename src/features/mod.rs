pub mod access;
pub mod auth;
pub mod dashboard;
pub mod reports;
pub mod tracking;
pub mod users;
pub mod waste_types;
pub mod wastes;
