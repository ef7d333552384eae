use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::waste_types::models::{WasteType, WasteTypeFields};
use crate::shared::types::PaginationQuery;

#[async_trait]
pub trait WasteTypeRepository: Send + Sync {
    /// Page of waste types, optionally narrowed by a case-insensitive name match
    async fn list(
        &self,
        search: Option<&str>,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<WasteType>, i64)>;

    async fn find(&self, id: Uuid) -> Result<Option<WasteType>>;

    async fn create(&self, fields: WasteTypeFields) -> Result<WasteType>;

    async fn update(&self, id: Uuid, fields: WasteTypeFields) -> Result<Option<WasteType>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn count(&self) -> Result<i64>;
}

pub struct PgWasteTypeRepository {
    pool: PgPool,
}

impl PgWasteTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_search(builder: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(term) = search {
        builder
            .push(" WHERE name ILIKE '%' || ")
            .push_bind(term.to_string())
            .push(" || '%'");
    }
}

#[async_trait]
impl WasteTypeRepository for PgWasteTypeRepository {
    async fn list(
        &self,
        search: Option<&str>,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<WasteType>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM waste_types");
        push_search(&mut count, search);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count waste types: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select =
            QueryBuilder::<Postgres>::new("SELECT id, name, description FROM waste_types");
        push_search(&mut select, search);
        select
            .push(" ORDER BY name, id LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let items = select
            .build_query_as::<WasteType>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list waste types: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((items, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<WasteType>> {
        sqlx::query_as::<_, WasteType>("SELECT id, name, description FROM waste_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch waste type: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn create(&self, fields: WasteTypeFields) -> Result<WasteType> {
        sqlx::query_as::<_, WasteType>(
            r#"
            INSERT INTO waste_types (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fields.name)
        .bind(&fields.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create waste type: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update(&self, id: Uuid, fields: WasteTypeFields) -> Result<Option<WasteType>> {
        sqlx::query_as::<_, WasteType>(
            r#"
            UPDATE waste_types SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update waste type: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM waste_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete waste type: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM waste_types")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count waste types: {:?}", e);
                AppError::Database(e)
            })
    }
}
