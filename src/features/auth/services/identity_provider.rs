use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::TokenService;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Identity, Requester, SessionTokens, TokenKind};
use crate::features::auth::password::CredentialHasher;
use crate::features::auth::repositories::{IdentityRepository, SessionRepository};
use crate::features::auth::JwtValidator;

/// Credential checks and session lifecycle
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The active identity matching both username and password, if any
    async fn verify_credential(&self, username: &str, password: &str) -> Result<Option<Identity>>;

    /// Start a new session for `identity`
    async fn issue_session_tokens(&self, identity: &Identity) -> Result<SessionTokens>;

    /// Resolve the `Authorization` header value.
    ///
    /// No header is anonymous; a header that does not resolve to a live
    /// session of an active identity is an error.
    async fn current_requester(&self, authorization: Option<&str>) -> Result<Requester>;

    /// Exchange a refresh token for a new pair in the same session
    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens>;

    /// End the session the user authenticated with; repeated calls succeed
    async fn end_session(&self, user: &AuthenticatedUser) -> Result<()>;

    async fn hash_password(&self, password: &str) -> Result<String>;
}

/// Identity provider backed by the local identity store and HS256 tokens
pub struct LocalIdentityProvider {
    identities: Arc<dyn IdentityRepository>,
    sessions: Arc<dyn SessionRepository>,
    tokens: TokenService,
    validator: JwtValidator,
    hasher: CredentialHasher,
}

impl LocalIdentityProvider {
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        sessions: Arc<dyn SessionRepository>,
        tokens: TokenService,
        validator: JwtValidator,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            identities,
            sessions,
            tokens,
            validator,
            hasher,
        }
    }

    async fn live_identity(&self, identity_id: Uuid, session_id: Uuid) -> Result<Identity> {
        if self.sessions.is_revoked(session_id).await? {
            return Err(AppError::Auth("Session has been revoked".to_string()));
        }

        match self.identities.find_by_id(identity_id).await? {
            Some(identity) if identity.is_active => Ok(identity),
            _ => Err(AppError::Auth("User not found or inactive".to_string())),
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn verify_credential(&self, username: &str, password: &str) -> Result<Option<Identity>> {
        let Some(identity) = self.identities.find_by_username(username).await? else {
            // Spend the same work as a real check so unknown usernames are not faster
            self.hasher.hash_blocking(password.to_string()).await?;
            return Ok(None);
        };

        let valid = self
            .hasher
            .verify_blocking(password.to_string(), identity.password_hash.clone())
            .await?;

        if valid && identity.is_active {
            Ok(Some(identity))
        } else {
            Ok(None)
        }
    }

    async fn issue_session_tokens(&self, identity: &Identity) -> Result<SessionTokens> {
        self.tokens.issue(identity.id, Uuid::new_v4())
    }

    async fn current_requester(&self, authorization: Option<&str>) -> Result<Requester> {
        let Some(header) = authorization else {
            return Ok(Requester::Anonymous);
        };

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = self.validator.validate_token(token.trim(), TokenKind::Access)?;
        let identity = self.live_identity(claims.sub, claims.sid).await?;

        Ok(Requester::Authenticated(AuthenticatedUser::from_identity(
            &identity,
            Some(claims.sid),
        )))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens> {
        let claims = self
            .validator
            .validate_token(refresh_token, TokenKind::Refresh)?;
        let identity = self.live_identity(claims.sub, claims.sid).await?;

        self.tokens.issue(identity.id, claims.sid)
    }

    async fn end_session(&self, user: &AuthenticatedUser) -> Result<()> {
        let Some(session_id) = user.session_id else {
            return Ok(());
        };

        self.sessions
            .revoke(session_id, user.identity_id, self.tokens.session_horizon())
            .await?;
        tracing::info!(identity_id = %user.identity_id, %session_id, "Session ended");

        // Housekeeping only; a failed purge must not fail the logout
        match self.sessions.purge_expired().await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!(purged, "Purged expired revoked sessions"),
            Err(e) => tracing::warn!("Failed to purge expired revoked sessions: {}", e),
        }

        Ok(())
    }

    async fn hash_password(&self, password: &str) -> Result<String> {
        self.hasher.hash_blocking(password.to_string()).await
    }
}
