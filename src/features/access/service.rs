use std::sync::Arc;

use uuid::Uuid;

use super::policy::{
    authorize, Action, Decision, Denial, Principal, ResolvedRole, ResourceKind, Subject, Target,
};
use crate::core::error::{AppError, Result};
use crate::features::auth::model::Requester;
use crate::features::users::models::{ProfileSeed, Role};
use crate::features::users::repositories::ProfileRepository;

/// Resolves requesters into policy principals and enforces decisions
pub struct AccessService {
    profiles: Arc<dyn ProfileRepository>,
}

impl AccessService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Resolve the requester's role for policy evaluation
    pub async fn resolve(&self, requester: &Requester) -> Principal {
        match requester.user() {
            None => Principal::Anonymous,
            Some(user) => Principal::Subject(Subject {
                identity_id: user.identity_id,
                role: self.lookup_role(user.identity_id).await,
                admin_equivalent: user.is_admin_equivalent(),
            }),
        }
    }

    /// Role stored on the identity's profile.
    ///
    /// Never fails: a missing profile is repaired with a citizen profile and a
    /// storage error resolves to citizen.
    pub async fn lookup_role(&self, identity_id: Uuid) -> ResolvedRole {
        let profile = match self.profiles.find_by_identity(identity_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                match self
                    .profiles
                    .get_or_create(identity_id, ProfileSeed::default_for(Role::Citizen))
                    .await
                {
                    Ok((profile, created)) => {
                        if created {
                            tracing::info!(%identity_id, "Created missing citizen profile");
                        }
                        profile
                    }
                    Err(e) => {
                        tracing::warn!(%identity_id, "Could not repair missing profile: {}", e);
                        return ResolvedRole::Known(Role::Citizen);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(%identity_id, "Profile lookup failed, assuming citizen: {}", e);
                return ResolvedRole::Known(Role::Citizen);
            }
        };

        match profile.role() {
            Some(role) => ResolvedRole::Known(role),
            None => {
                tracing::warn!(%identity_id, role = %profile.role, "Unrecognised stored role");
                ResolvedRole::Unrecognized
            }
        }
    }

    /// Evaluate the policy and turn a denial into the matching error
    pub fn enforce(
        &self,
        principal: &Principal,
        action: Action,
        kind: ResourceKind,
        target: Option<&Target>,
    ) -> Result<()> {
        match authorize(principal, action, kind, target) {
            Decision::Allow => Ok(()),
            Decision::Deny(denial) => {
                tracing::debug!(?principal, ?action, ?kind, ?denial, "Access denied");
                Err(match denial {
                    Denial::AuthenticationRequired => {
                        AppError::Unauthorized("Authentication required".to_string())
                    }
                    Denial::Forbidden(reason) => AppError::Forbidden(reason.to_string()),
                })
            }
        }
    }
}
