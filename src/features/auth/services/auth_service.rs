use std::sync::Arc;

use validator::Validate;

use crate::core::config::BootstrapAdminConfig;
use crate::core::error::{AppError, Result};
use crate::features::access::{AccessService, Action, ResourceKind};
use crate::features::auth::dtos::{
    LoginRequestDto, LoginResponseDto, MeResponseDto, RegisterRequestDto, RegisterResponseDto,
    UserSummaryDto,
};
use crate::features::auth::model::{NewIdentity, Requester, SessionTokens};
use crate::features::auth::repositories::IdentityRepository;
use crate::features::auth::services::IdentityProvider;
use crate::features::users::models::{ProfileSeed, Role};
use crate::features::users::services::UserProfileService;
use crate::shared::constants::INVALID_CREDENTIALS;
use crate::shared::types::FieldErrors;

/// Registration, login and session management
pub struct AuthService {
    identity_provider: Arc<dyn IdentityProvider>,
    identities: Arc<dyn IdentityRepository>,
    user_profiles: Arc<UserProfileService>,
    access: Arc<AccessService>,
}

impl AuthService {
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        identities: Arc<dyn IdentityRepository>,
        user_profiles: Arc<UserProfileService>,
        access: Arc<AccessService>,
    ) -> Self {
        Self {
            identity_provider,
            identities,
            user_profiles,
            access,
        }
    }

    /// Register a new identity together with its profile.
    ///
    /// Every field problem is reported at once, keyed by field name. Nothing is
    /// persisted unless both records can be written.
    pub async fn register(
        &self,
        requester: &Requester,
        dto: RegisterRequestDto,
    ) -> Result<RegisterResponseDto> {
        let principal = self.access.resolve(requester).await;
        self.access
            .enforce(&principal, Action::Create, ResourceKind::Account, None)?;

        let dto = dto.normalized();

        let mut errors = match dto.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => match AppError::from(e) {
                AppError::FieldValidation(fields) => fields,
                other => return Err(other),
            },
        };

        if dto.password != dto.password2 {
            push_error(&mut errors, "password2", "Passwords do not match.");
        }

        let role = match dto.role.as_deref() {
            None => Some(Role::Citizen),
            Some(value) => match Role::parse_choice(value) {
                Ok(role) => Some(role),
                Err(AppError::FieldValidation(fields)) => {
                    merge(&mut errors, fields);
                    None
                }
                Err(other) => return Err(other),
            },
        };

        if !errors.is_empty() {
            return Err(AppError::FieldValidation(errors));
        }

        if self.identities.username_taken(&dto.username).await? {
            push_error(&mut errors, "username", already_exists("username"));
        }
        let email = dto.email.unwrap_or_default();
        if self.identities.email_taken(&email).await? {
            push_error(&mut errors, "email", already_exists("email"));
        }
        if !errors.is_empty() {
            return Err(AppError::FieldValidation(errors));
        }

        let role = role.unwrap_or(Role::Citizen);
        let password_hash = self.identity_provider.hash_password(&dto.password).await?;

        let identity = NewIdentity {
            username: dto.username,
            email,
            password_hash,
            first_name: dto.first_name.unwrap_or_default(),
            last_name: dto.last_name.unwrap_or_default(),
            is_superuser: false,
            is_staff: false,
        };
        let seed = ProfileSeed {
            role,
            phone_number: dto.phone_number.unwrap_or_default(),
            location: dto.location,
        };

        let (identity, profile) = self
            .identities
            .create_with_profile(identity, seed)
            .await
            .map_err(|e| match e {
                AppError::Conflict(field) => {
                    let message = already_exists(&field);
                    AppError::field(field, message)
                }
                other => other,
            })?;

        tracing::info!(identity_id = %identity.id, role = %profile.role, "Identity registered");

        Ok(RegisterResponseDto {
            id: identity.id,
            username: identity.username,
            email: identity.email,
            first_name: identity.first_name,
            last_name: identity.last_name,
            role,
        })
    }

    /// Verify credentials, reconcile the profile and start a session
    pub async fn login(
        &self,
        requester: &Requester,
        dto: LoginRequestDto,
    ) -> Result<LoginResponseDto> {
        let principal = self.access.resolve(requester).await;
        self.access
            .enforce(&principal, Action::Login, ResourceKind::Account, None)?;

        if dto.validate().is_err() {
            return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        let identity = self
            .identity_provider
            .verify_credential(&dto.username, &dto.password)
            .await?
            .ok_or_else(|| {
                tracing::info!("Rejected login attempt");
                AppError::Auth(INVALID_CREDENTIALS.to_string())
            })?;

        let profile = self.user_profiles.reconcile(&identity).await?;
        let tokens = self.identity_provider.issue_session_tokens(&identity).await?;

        tracing::info!(identity_id = %identity.id, role = %profile.role, "Login succeeded");

        Ok(LoginResponseDto {
            user: UserSummaryDto::from(&identity),
            role: profile.role(),
            tokens,
        })
    }

    /// End the requester's session; anonymous requesters are a no-op
    pub async fn logout(&self, requester: &Requester) -> Result<()> {
        match requester.user() {
            Some(user) => self.identity_provider.end_session(user).await,
            None => Ok(()),
        }
    }

    /// Log out the session named by an `Authorization` header value.
    ///
    /// A token that no longer resolves (revoked, expired, malformed) has no
    /// session left to end, so it is treated like an anonymous logout.
    pub async fn logout_bearer(&self, authorization: Option<&str>) -> Result<()> {
        match self.identity_provider.current_requester(authorization).await {
            Ok(requester) => self.logout(&requester).await,
            Err(AppError::Auth(reason)) | Err(AppError::Unauthorized(reason)) => {
                tracing::debug!(%reason, "Logout without a live session");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens> {
        self.identity_provider.refresh(refresh_token).await
    }

    pub async fn me(&self, requester: &Requester) -> Result<MeResponseDto> {
        let user = requester
            .user()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let identity = self
            .identities
            .find_by_id(user.identity_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let profile = self.user_profiles.reconcile(&identity).await?;

        Ok(MeResponseDto {
            user: UserSummaryDto::from(&identity),
            role: profile.role(),
        })
    }

    /// Make sure the configured superuser exists; an existing username is left untouched
    pub async fn ensure_bootstrap_admin(&self, config: &BootstrapAdminConfig) -> Result<()> {
        if self.identities.username_taken(&config.username).await? {
            tracing::info!(username = %config.username, "Bootstrap admin already present");
            return Ok(());
        }

        let password_hash = self.identity_provider.hash_password(&config.password).await?;
        let identity = NewIdentity {
            username: config.username.clone(),
            email: config.email.clone(),
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            is_superuser: true,
            is_staff: true,
        };

        match self
            .identities
            .create_with_profile(identity, ProfileSeed::default_for(Role::Admin))
            .await
        {
            Ok((identity, _)) => {
                tracing::info!(identity_id = %identity.id, "Bootstrap admin created");
                Ok(())
            }
            // Another instance won the race
            Err(AppError::Conflict(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn already_exists(field: &str) -> String {
    format!("A user with that {} already exists.", field)
}

fn push_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.into());
}

fn merge(errors: &mut FieldErrors, other: FieldErrors) {
    for (field, messages) in other {
        errors.entry(field).or_default().extend(messages);
    }
}
