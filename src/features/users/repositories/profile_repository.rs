use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::database::unique_violation_field;
use crate::core::error::{AppError, Result};
use crate::features::access::Visibility;
use crate::features::users::models::{Profile, ProfileSeed, Role, UpdateProfile};

const PROFILE_COLUMNS: &str = "id, identity_id, role, phone_number, location, created_at";
const PROFILE_CONSTRAINTS: &[(&str, &str)] = &[("profiles_identity_id_key", "identity_id")];

/// Storage for the role-carrying profile attached to each identity
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_identity(&self, identity_id: Uuid) -> Result<Option<Profile>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>>;

    /// Page of profiles inside `visibility` plus the total count
    async fn list(
        &self,
        visibility: &Visibility,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Profile>, i64)>;

    /// Fetch the identity's profile, creating it from `seed` when absent.
    ///
    /// Returns the profile and whether it was created by this call. Safe under
    /// concurrent first logins: exactly one insert wins.
    async fn get_or_create(&self, identity_id: Uuid, seed: ProfileSeed) -> Result<(Profile, bool)>;

    /// Insert a new profile; fails with `Conflict("identity_id")` if one exists
    async fn create(&self, identity_id: Uuid, seed: ProfileSeed) -> Result<Profile>;

    /// Set the role, creating the profile if the identity has none
    async fn set_role(&self, identity_id: Uuid, role: Role) -> Result<Profile>;

    async fn update(&self, id: Uuid, changes: UpdateProfile) -> Result<Option<Profile>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_write_error(e: sqlx::Error) -> AppError {
        if let Some(field) = unique_violation_field(&e, PROFILE_CONSTRAINTS) {
            return AppError::Conflict(field.to_string());
        }
        if e
            .as_database_error()
            .is_some_and(|db| db.is_foreign_key_violation())
        {
            return AppError::field("identity_id", "Identity not found.");
        }
        tracing::error!("Failed to write profile: {:?}", e);
        AppError::Database(e)
    }
}

fn push_visibility(builder: &mut QueryBuilder<'_, Postgres>, visibility: &Visibility) {
    match visibility {
        Visibility::Everything => builder.push(" WHERE TRUE"),
        Visibility::Nothing => builder.push(" WHERE FALSE"),
        Visibility::OwnedBy(id) => builder.push(" WHERE identity_id = ").push_bind(*id),
    };
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_identity(&self, identity_id: Uuid) -> Result<Option<Profile>> {
        let sql = format!("SELECT {} FROM profiles WHERE identity_id = $1", PROFILE_COLUMNS);
        sqlx::query_as::<_, Profile>(&sql)
            .bind(identity_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch profile by identity: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch profile: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list(
        &self,
        visibility: &Visibility,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Profile>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM profiles");
        push_visibility(&mut count, visibility);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count profiles: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM profiles", PROFILE_COLUMNS));
        push_visibility(&mut select, visibility);
        select
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let profiles = select
            .build_query_as::<Profile>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list profiles: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((profiles, total))
    }

    async fn get_or_create(&self, identity_id: Uuid, seed: ProfileSeed) -> Result<(Profile, bool)> {
        let sql = format!(
            r#"
            INSERT INTO profiles (id, identity_id, role, phone_number, location)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (identity_id) DO NOTHING
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let inserted = sqlx::query_as::<_, Profile>(&sql)
            .bind(Uuid::new_v4())
            .bind(identity_id)
            .bind(seed.role.as_str())
            .bind(&seed.phone_number)
            .bind(&seed.location)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::map_write_error)?;

        if let Some(profile) = inserted {
            return Ok((profile, true));
        }

        let existing = self.find_by_identity(identity_id).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "Profile for identity {} vanished after insert conflict",
                identity_id
            ))
        })?;

        Ok((existing, false))
    }

    async fn create(&self, identity_id: Uuid, seed: ProfileSeed) -> Result<Profile> {
        let sql = format!(
            r#"
            INSERT INTO profiles (id, identity_id, role, phone_number, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        sqlx::query_as::<_, Profile>(&sql)
            .bind(Uuid::new_v4())
            .bind(identity_id)
            .bind(seed.role.as_str())
            .bind(&seed.phone_number)
            .bind(&seed.location)
            .fetch_one(&self.pool)
            .await
            .map_err(Self::map_write_error)
    }

    async fn set_role(&self, identity_id: Uuid, role: Role) -> Result<Profile> {
        let sql = format!(
            r#"
            INSERT INTO profiles (id, identity_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (identity_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        sqlx::query_as::<_, Profile>(&sql)
            .bind(Uuid::new_v4())
            .bind(identity_id)
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(Self::map_write_error)
    }

    async fn update(&self, id: Uuid, changes: UpdateProfile) -> Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles SET
                role = COALESCE($2, role),
                phone_number = COALESCE($3, phone_number),
                location = COALESCE($4, location)
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(changes.role.map(|r| r.as_str()))
            .bind(changes.phone_number)
            .bind(changes.location)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::map_write_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete profile: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
