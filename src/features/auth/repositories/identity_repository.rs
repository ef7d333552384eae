use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::unique_violation_field;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{Identity, NewIdentity};
use crate::features::users::models::{Profile, ProfileSeed};

const IDENTITY_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
                                is_superuser, is_staff, is_active";

const IDENTITY_CONSTRAINTS: &[(&str, &str)] = &[
    ("identities_username_lower_idx", "username"),
    ("identities_email_lower_idx", "email"),
];

#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>>;

    /// Exact username match, as used by credential checks
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>>;

    /// Case-insensitive username existence check
    async fn username_taken(&self, username: &str) -> Result<bool>;

    /// Case-insensitive email existence check; empty emails never collide
    async fn email_taken(&self, email: &str) -> Result<bool>;

    /// Insert identity and profile atomically.
    ///
    /// A uniqueness race lost at the database surfaces as
    /// `Conflict("username")` or `Conflict("email")` and nothing is persisted.
    async fn create_with_profile(
        &self,
        identity: NewIdentity,
        profile: ProfileSeed,
    ) -> Result<(Identity, Profile)>;
}

pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_identity_write_error(e: sqlx::Error) -> AppError {
    match unique_violation_field(&e, IDENTITY_CONSTRAINTS) {
        Some(field) => AppError::Conflict(field.to_string()),
        None => {
            tracing::error!("Failed to create identity: {:?}", e);
            AppError::Database(e)
        }
    }
}

#[async_trait]
impl IdentityRepository for PgIdentityRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        let sql = format!("SELECT {} FROM identities WHERE id = $1", IDENTITY_COLUMNS);
        sqlx::query_as::<_, Identity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch identity: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>> {
        let sql = format!(
            "SELECT {} FROM identities WHERE username = $1",
            IDENTITY_COLUMNS
        );
        sqlx::query_as::<_, Identity>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch identity by username: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM identities WHERE lower(username) = lower($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check username: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn email_taken(&self, email: &str) -> Result<bool> {
        if email.is_empty() {
            return Ok(false);
        }

        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM identities WHERE email <> '' AND lower(email) = lower($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check email: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn create_with_profile(
        &self,
        identity: NewIdentity,
        profile: ProfileSeed,
    ) -> Result<(Identity, Profile)> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let sql = format!(
            r#"
            INSERT INTO identities
                (id, username, email, password_hash, first_name, last_name, is_superuser, is_staff)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            IDENTITY_COLUMNS
        );

        let created = sqlx::query_as::<_, Identity>(&sql)
            .bind(Uuid::new_v4())
            .bind(&identity.username)
            .bind(&identity.email)
            .bind(&identity.password_hash)
            .bind(&identity.first_name)
            .bind(&identity.last_name)
            .bind(identity.is_superuser)
            .bind(identity.is_staff)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_identity_write_error)?;

        let created_profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, identity_id, role, phone_number, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, identity_id, role, phone_number, location, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(created.id)
        .bind(profile.role.as_str())
        .bind(&profile.phone_number)
        .bind(&profile.location)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create profile for new identity: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit identity transaction: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((created, created_profile))
    }
}
