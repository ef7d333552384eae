use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// Map a unique-constraint violation onto the field it protects.
///
/// `constraints` pairs database constraint/index names with request field names.
/// Any other database error is returned unchanged.
pub fn unique_violation_field(
    error: &sqlx::Error,
    constraints: &[(&str, &'static str)],
) -> Option<&'static str> {
    let db_error = error.as_database_error()?;
    if !db_error.is_unique_violation() {
        return None;
    }

    let constraint = db_error.constraint()?;
    constraints
        .iter()
        .find(|(name, _)| *name == constraint)
        .map(|(_, field)| *field)
}
