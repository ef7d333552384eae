use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Denylist of ended sessions.
///
/// Tokens are stateless, so logout records the session id until the last
/// token issued for it would have expired anyway.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Record the session as ended; revoking twice is a no-op
    async fn revoke(
        &self,
        session_id: Uuid,
        identity_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn is_revoked(&self, session_id: Uuid) -> Result<bool>;

    /// Drop entries whose tokens have all expired; returns how many were removed
    async fn purge_expired(&self) -> Result<u64>;
}

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn revoke(
        &self,
        session_id: Uuid,
        identity_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO revoked_sessions (session_id, identity_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_id) DO NOTHING
            "#,
        )
        .bind(session_id)
        .bind(identity_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to revoke session: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn is_revoked(&self, session_id: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM revoked_sessions WHERE session_id = $1)",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check revoked session: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM revoked_sessions WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to purge revoked sessions: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }
}
