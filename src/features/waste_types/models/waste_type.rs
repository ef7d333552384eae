use sqlx::FromRow;
use uuid::Uuid;

/// Catalog entry for a kind of waste
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct WasteType {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Fields written on create and full update
#[derive(Debug, Clone)]
pub struct WasteTypeFields {
    pub name: String,
    pub description: String,
}
