use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::record::{ColumnValue, NewTrackedRecord, TrackedRecord, TrackedResource};
use super::status::StatusLifecycle;
use crate::core::error::{AppError, Result};
use crate::features::access::{QuerySpec, SortField, Visibility};

#[async_trait]
pub trait TrackedRecordRepository<R: TrackedResource>: Send + Sync {
    /// Page of records matching `spec` plus the total match count
    async fn list(&self, spec: &QuerySpec<R::Status>) -> Result<(Vec<TrackedRecord<R>>, i64)>;

    /// The record with `id`, if it lies inside `visibility`
    async fn find(&self, id: Uuid, visibility: &Visibility) -> Result<Option<TrackedRecord<R>>>;

    async fn insert(&self, record: NewTrackedRecord<R>) -> Result<TrackedRecord<R>>;

    /// Persist the mutable columns of `record`; `None` if it no longer exists
    async fn save(&self, record: &TrackedRecord<R>) -> Result<Option<TrackedRecord<R>>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Number of records, optionally only those in `status`
    async fn count(&self, status: Option<R::Status>) -> Result<i64>;
}

pub struct PgTrackedRecordRepository<R> {
    pool: PgPool,
    _resource: PhantomData<fn() -> R>,
}

impl<R: TrackedResource> PgTrackedRecordRepository<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _resource: PhantomData,
        }
    }
}

/// Projection over `t` (the record) joined with `i` (its owner)
fn projection<R: TrackedResource>() -> String {
    let mut columns = vec![
        "t.id".to_string(),
        "t.user_id".to_string(),
        "t.waste_type".to_string(),
        "t.location".to_string(),
        "t.status".to_string(),
        format!("t.{} AS created_at", R::CREATED_AT_COLUMN),
    ];
    columns.extend(R::DETAIL_COLUMNS.iter().map(|c| format!("t.{}", c)));
    columns.push("i.username AS owner_username".to_string());
    columns.push("i.email AS owner_email".to_string());

    format!(
        "SELECT {} FROM t LEFT JOIN identities i ON i.id = t.user_id",
        columns.join(", ")
    )
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: ColumnValue) {
    match value {
        ColumnValue::Text(v) => builder.push_bind(v),
        ColumnValue::OptionalText(v) => builder.push_bind(v),
        ColumnValue::Float(v) => builder.push_bind(v),
    };
}

/// Escape LIKE wildcards so the term matches literally
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Append the WHERE clause for visibility, status and search
pub(crate) fn push_filters<S: StatusLifecycle>(
    builder: &mut QueryBuilder<'_, Postgres>,
    spec: &QuerySpec<S>,
) {
    match spec.visibility {
        Visibility::Everything => builder.push(" WHERE TRUE"),
        Visibility::Nothing => builder.push(" WHERE FALSE"),
        Visibility::OwnedBy(owner) => builder.push(" WHERE t.user_id = ").push_bind(owner),
    };

    if let Some(status) = spec.filters.status {
        builder.push(" AND t.status = ").push_bind(status.as_str());
    }

    if let Some(term) = spec.search_term() {
        let pattern = like_pattern(term);
        builder
            .push(" AND (t.waste_type ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.location ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Append ORDER BY and pagination
pub(crate) fn push_page<S>(builder: &mut QueryBuilder<'_, Postgres>, spec: &QuerySpec<S>) {
    let ordering = spec.filters.ordering;
    let column = match ordering.field {
        SortField::CreatedAt => "created_at",
        SortField::Status => "status",
    };
    let direction = if ordering.descending { "DESC" } else { "ASC" };

    builder
        .push(format!(
            " ORDER BY {} {}, id {}",
            column, direction, direction
        ))
        .push(" LIMIT ")
        .push_bind(spec.filters.pagination.limit())
        .push(" OFFSET ")
        .push_bind(spec.filters.pagination.offset());
}

fn database_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("{}: {:?}", context, e);
        AppError::Database(e)
    }
}

#[async_trait]
impl<R: TrackedResource> TrackedRecordRepository<R> for PgTrackedRecordRepository<R> {
    async fn list(&self, spec: &QuerySpec<R::Status>) -> Result<(Vec<TrackedRecord<R>>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {} t", R::TABLE));
        push_filters(&mut count, spec);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(database_error("Failed to count records"))?;

        // Filter inside the CTE so ordering and paging see only visible rows
        let mut select = QueryBuilder::<Postgres>::new(format!(
            "WITH t AS (SELECT t.* FROM {} t",
            R::TABLE
        ));
        push_filters(&mut select, spec);
        select.push(") ");
        select.push(projection::<R>());
        push_page(&mut select, spec);

        let records = select
            .build_query_as::<TrackedRecord<R>>()
            .fetch_all(&self.pool)
            .await
            .map_err(database_error("Failed to list records"))?;

        Ok((records, total))
    }

    async fn find(&self, id: Uuid, visibility: &Visibility) -> Result<Option<TrackedRecord<R>>> {
        let mut select = QueryBuilder::<Postgres>::new(format!(
            "WITH t AS (SELECT * FROM {} WHERE id = ",
            R::TABLE
        ));
        select.push_bind(id);
        match visibility {
            Visibility::Everything => select.push(")"),
            Visibility::Nothing => select.push(" AND FALSE)"),
            Visibility::OwnedBy(owner) => select.push(" AND user_id = ").push_bind(*owner).push(")"),
        };
        select.push(" ").push(projection::<R>());

        select
            .build_query_as::<TrackedRecord<R>>()
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error("Failed to fetch record"))
    }

    async fn insert(&self, record: NewTrackedRecord<R>) -> Result<TrackedRecord<R>> {
        let mut columns = vec!["id", "user_id", "waste_type", "location", "status"];
        columns.extend(R::DETAIL_COLUMNS);

        let mut insert = QueryBuilder::<Postgres>::new(format!(
            "WITH t AS (INSERT INTO {} ({}) VALUES (",
            R::TABLE,
            columns.join(", ")
        ));
        {
            let mut values = insert.separated(", ");
            values.push_bind(Uuid::new_v4());
            values.push_bind(record.owner_id);
            values.push_bind(record.waste_type);
            values.push_bind(record.location);
            values.push_bind(record.status.as_str());
        }
        for value in R::detail_values(&record.details) {
            insert.push(", ");
            push_value(&mut insert, value);
        }
        insert.push(") RETURNING *) ").push(projection::<R>());

        insert
            .build_query_as::<TrackedRecord<R>>()
            .fetch_one(&self.pool)
            .await
            .map_err(database_error("Failed to insert record"))
    }

    async fn save(&self, record: &TrackedRecord<R>) -> Result<Option<TrackedRecord<R>>> {
        let mut update = QueryBuilder::<Postgres>::new(format!("WITH t AS (UPDATE {} SET ", R::TABLE));
        update
            .push("waste_type = ")
            .push_bind(record.waste_type.clone())
            .push(", location = ")
            .push_bind(record.location.clone())
            .push(", status = ")
            .push_bind(record.status.as_str());

        for (column, value) in R::DETAIL_COLUMNS
            .iter()
            .zip(R::detail_values(&record.details))
        {
            update.push(format!(", {} = ", column));
            push_value(&mut update, value);
        }

        update
            .push(" WHERE id = ")
            .push_bind(record.id)
            .push(" RETURNING *) ")
            .push(projection::<R>());

        update
            .build_query_as::<TrackedRecord<R>>()
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error("Failed to update record"))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", R::TABLE);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error("Failed to delete record"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, status: Option<R::Status>) -> Result<i64> {
        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", R::TABLE));
        if let Some(status) = status {
            count.push(" WHERE status = ").push_bind(status.as_str());
        }

        count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(database_error("Failed to count records"))
    }
}
