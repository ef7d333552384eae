use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::access::scope::scope;
use crate::features::access::{AccessService, Action, ResourceKind, Target};
use crate::features::auth::model::{Identity, Requester};
use crate::features::auth::repositories::IdentityRepository;
use crate::features::users::dtos::{CreateProfileDto, ProfileResponseDto, UpdateProfileDto};
use crate::features::users::models::{Profile, ProfileSeed, Role, UpdateProfile};
use crate::features::users::repositories::ProfileRepository;
use crate::shared::types::PaginationQuery;

/// Profile reconciliation and administration
pub struct UserProfileService {
    profiles: Arc<dyn ProfileRepository>,
    identities: Arc<dyn IdentityRepository>,
    access: Arc<AccessService>,
}

impl UserProfileService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        identities: Arc<dyn IdentityRepository>,
        access: Arc<AccessService>,
    ) -> Self {
        Self {
            profiles,
            identities,
            access,
        }
    }

    /// Bring the identity's profile in line with its account flags.
    ///
    /// Admin-equivalent identities always end up with an `admin` profile; any
    /// other identity gets a citizen profile if it has none.
    pub async fn reconcile(&self, identity: &Identity) -> Result<Profile> {
        if !identity.is_admin_equivalent() {
            let (profile, created) = self
                .profiles
                .get_or_create(identity.id, ProfileSeed::default_for(Role::Citizen))
                .await?;
            if created {
                tracing::info!(identity_id = %identity.id, "Provisioned missing citizen profile");
            }
            return Ok(profile);
        }

        match self.profiles.find_by_identity(identity.id).await? {
            Some(profile) if profile.role() == Some(Role::Admin) => Ok(profile),
            existing => {
                let profile = self.profiles.set_role(identity.id, Role::Admin).await?;
                tracing::info!(
                    identity_id = %identity.id,
                    previous_role = existing.as_ref().map(|p| p.role.as_str()).unwrap_or("none"),
                    "Corrected profile role to admin"
                );
                Ok(profile)
            }
        }
    }

    /// The requester's own profile
    pub async fn me(&self, requester: &Requester) -> Result<ProfileResponseDto> {
        let user = requester
            .user()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        self.profiles
            .find_by_identity(user.identity_id)
            .await?
            .map(ProfileResponseDto::from)
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    pub async fn list(
        &self,
        requester: &Requester,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ProfileResponseDto>, i64)> {
        let principal = self.access.resolve(requester).await;
        self.access
            .enforce(&principal, Action::List, ResourceKind::Profile, None)?;

        let visibility = scope(&principal, ResourceKind::Profile);
        let (profiles, total) = self
            .profiles
            .list(&visibility, pagination.limit(), pagination.offset())
            .await?;

        Ok((profiles.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, requester: &Requester, id: Uuid) -> Result<ProfileResponseDto> {
        let principal = self.access.resolve(requester).await;
        self.access
            .enforce(&principal, Action::Retrieve, ResourceKind::Profile, None)?;

        let profile = self.find(id).await?;
        self.access.enforce(
            &principal,
            Action::Retrieve,
            ResourceKind::Profile,
            Some(&Target {
                owner_id: Some(profile.identity_id),
            }),
        )?;

        Ok(profile.into())
    }

    pub async fn create(
        &self,
        requester: &Requester,
        dto: CreateProfileDto,
    ) -> Result<ProfileResponseDto> {
        let principal = self.access.resolve(requester).await;
        self.access
            .enforce(&principal, Action::Create, ResourceKind::Profile, None)?;

        let role = match dto.role.as_deref() {
            Some(value) => Role::parse_choice(value)?,
            None => Role::Citizen,
        };

        if self.identities.find_by_id(dto.identity_id).await?.is_none() {
            return Err(AppError::field("identity_id", "Identity not found."));
        }

        let seed = ProfileSeed {
            role,
            phone_number: dto.phone_number.unwrap_or_default(),
            location: dto.location,
        };

        let profile = self
            .profiles
            .create(dto.identity_id, seed)
            .await
            .map_err(|e| match e {
                AppError::Conflict(field) => {
                    AppError::field(field, "This identity already has a profile.")
                }
                other => other,
            })?;

        tracing::info!(profile_id = %profile.id, identity_id = %profile.identity_id, "Profile created");
        Ok(profile.into())
    }

    pub async fn update(
        &self,
        requester: &Requester,
        id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<ProfileResponseDto> {
        let principal = self.access.resolve(requester).await;
        self.access
            .enforce(&principal, Action::Update, ResourceKind::Profile, None)?;

        let changes = UpdateProfile {
            role: dto.role.as_deref().map(Role::parse_choice).transpose()?,
            phone_number: dto.phone_number,
            location: dto.location,
        };

        self.profiles
            .update(id, changes)
            .await?
            .map(ProfileResponseDto::from)
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", id)))
    }

    pub async fn delete(&self, requester: &Requester, id: Uuid) -> Result<()> {
        let principal = self.access.resolve(requester).await;
        self.access
            .enforce(&principal, Action::Delete, ResourceKind::Profile, None)?;

        if !self.profiles.delete(id).await? {
            return Err(AppError::NotFound(format!("Profile {} not found", id)));
        }

        tracing::info!(profile_id = %id, "Profile deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Profile> {
        self.profiles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", id)))
    }
}
