use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Database model for an account identity
#[derive(Debug, Clone, FromRow)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// argon2id PHC string
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub is_active: bool,
}

impl Identity {
    /// Superuser and staff accounts behave as admins regardless of their profile
    pub fn is_admin_equivalent(&self) -> bool {
        self.is_superuser || self.is_staff
    }
}

/// Data for creating a new identity
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
    pub is_staff: bool,
}

/// Identity attached to an authenticated request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub identity_id: Uuid,
    pub username: String,
    pub email: String,
    pub is_superuser: bool,
    pub is_staff: bool,
    /// Session the presented token belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

impl AuthenticatedUser {
    pub fn from_identity(identity: &Identity, session_id: Option<Uuid>) -> Self {
        Self {
            identity_id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            is_superuser: identity.is_superuser,
            is_staff: identity.is_staff,
            session_id,
        }
    }

    pub fn is_admin_equivalent(&self) -> bool {
        self.is_superuser || self.is_staff
    }
}

/// Who is making the request
#[derive(Debug, Clone)]
pub enum Requester {
    Anonymous,
    Authenticated(AuthenticatedUser),
}

impl Requester {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Requester::Anonymous => None,
            Requester::Authenticated(user) => Some(user),
        }
    }
}

/// Access/refresh token pair for one session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionTokens {
    pub access: String,
    pub refresh: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Purpose of a signed session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by locally issued session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity id
    pub sub: Uuid,
    /// Session id shared by the access/refresh pair
    pub sid: Uuid,
    pub jti: Uuid,
    pub kind: TokenKind,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}
