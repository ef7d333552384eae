//! Authorization policy.
//!
//! [`authorize`] is a pure function over an already resolved [`Principal`]:
//! the profile lookup that produces the principal lives in
//! [`AccessService`](super::AccessService), so every rule here can be tested
//! without a store.
//!
//! Evaluation order (first match wins):
//!
//! 1. anonymous requesters get public catalog reads, registration, login and
//!    scoped (empty) lists of owned records;
//! 2. admin-equivalent subjects (superuser/staff or role `admin`) get everything;
//! 3. the declared role decides the action;
//! 4. when a target is given, non-elevated subjects must own it.

use uuid::Uuid;

use crate::features::users::models::Role;

/// Kind of resource an action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Account registration and login
    Account,
    Report,
    Waste,
    WasteType,
    Profile,
    Dashboard,
}

impl ResourceKind {
    /// Records that carry an owner and are scoped per requester
    pub fn is_owned(self) -> bool {
        matches!(
            self,
            ResourceKind::Report | ResourceKind::Waste | ResourceKind::Profile
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    /// Modify descriptive fields (anything other than a status-only change)
    Update,
    /// Change only the status field
    UpdateStatus,
    Delete,
    Login,
}

impl Action {
    pub fn is_read(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// Role as seen by the policy; stored roles outside [`Role`] are `Unrecognized`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedRole {
    Known(Role),
    Unrecognized,
}

/// Authenticated requester resolved for policy evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub identity_id: Uuid,
    pub role: ResolvedRole,
    /// Identity flagged superuser or staff
    pub admin_equivalent: bool,
}

impl Subject {
    pub fn is_admin(&self) -> bool {
        self.admin_equivalent || self.role == ResolvedRole::Known(Role::Admin)
    }

    /// Officers see and triage every owned record
    pub fn is_elevated(&self) -> bool {
        self.is_admin() || self.role == ResolvedRole::Known(Role::Officer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Subject(Subject),
}

impl Principal {
    pub fn subject(&self) -> Option<&Subject> {
        match self {
            Principal::Anonymous => None,
            Principal::Subject(subject) => Some(subject),
        }
    }
}

/// Target of an object-level check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// Owning identity; `None` for legacy rows whose owner is gone
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    AuthenticationRequired,
    Forbidden(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    #[cfg(test)]
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn forbid(reason: &'static str) -> Self {
        Decision::Deny(Denial::Forbidden(reason))
    }
}

const ADMIN_REQUIRED: &str = "Admin access required";
const CATALOG_ADMIN_ONLY: &str = "Only admins can modify the waste type catalog";
const REPORTS_BY_CITIZENS: &str = "Only citizens can submit reports";
const OFFICER_STATUS_ONLY: &str = "Officers may only change the status field";
const OFFICER_NO_DELETE: &str = "Officers cannot delete records";
const STATUS_BY_STAFF: &str = "Only officers and admins can change the status";
const CITIZEN_NO_EDIT: &str = "Submitted records cannot be modified or deleted by citizens";
const UNRECOGNISED_ROLE: &str = "Your role does not allow this action";
const NOT_OWNER: &str = "You do not have permission to access this resource";

/// Decide whether `principal` may perform `action` on `kind` (and on `target`, if given).
pub fn authorize(
    principal: &Principal,
    action: Action,
    kind: ResourceKind,
    target: Option<&Target>,
) -> Decision {
    let subject = match principal {
        Principal::Anonymous => return anonymous(action, kind),
        Principal::Subject(subject) => subject,
    };

    if subject.is_admin() {
        return Decision::Allow;
    }

    let decision = match subject.role {
        ResolvedRole::Known(Role::Officer) => officer(action, kind),
        ResolvedRole::Known(Role::Citizen) => citizen(action, kind),
        ResolvedRole::Known(Role::Admin) => Decision::Allow,
        ResolvedRole::Unrecognized => default_safe(action, kind),
    };

    match (decision, target) {
        (Decision::Allow, Some(target)) => object_level(subject, kind, target),
        (decision, _) => decision,
    }
}

/// Classify a partial update by the fields it touches.
///
/// Exactly one field named `status` is a status change; anything else,
/// including an empty payload, is a general update.
pub fn classify_patch<'a, I>(fields: I) -> Action
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fields = fields.into_iter();
    match (fields.next(), fields.next()) {
        (Some("status"), None) => Action::UpdateStatus,
        _ => Action::Update,
    }
}

fn anonymous(action: Action, kind: ResourceKind) -> Decision {
    match (kind, action) {
        (ResourceKind::WasteType, a) if a.is_read() => Decision::Allow,
        (ResourceKind::Account, Action::Create | Action::Login) => Decision::Allow,
        // Scoping turns this into an empty result
        (ResourceKind::Report | ResourceKind::Waste, Action::List) => Decision::Allow,
        _ => Decision::Deny(Denial::AuthenticationRequired),
    }
}

fn common(action: Action, kind: ResourceKind) -> Option<Decision> {
    match kind {
        ResourceKind::Account => Some(Decision::Allow),
        ResourceKind::Dashboard if action.is_read() => Some(Decision::Allow),
        ResourceKind::Dashboard => Some(Decision::forbid(ADMIN_REQUIRED)),
        ResourceKind::WasteType if action.is_read() => Some(Decision::Allow),
        ResourceKind::WasteType => Some(Decision::forbid(CATALOG_ADMIN_ONLY)),
        // Only a subject's own profile, checked at object level
        ResourceKind::Profile if action == Action::Retrieve => Some(Decision::Allow),
        ResourceKind::Profile => Some(Decision::forbid(ADMIN_REQUIRED)),
        ResourceKind::Report | ResourceKind::Waste => None,
    }
}

fn officer(action: Action, kind: ResourceKind) -> Decision {
    if let Some(decision) = common(action, kind) {
        return decision;
    }

    match action {
        Action::List | Action::Retrieve | Action::UpdateStatus | Action::Login => Decision::Allow,
        Action::Create if kind == ResourceKind::Report => Decision::forbid(REPORTS_BY_CITIZENS),
        Action::Create => Decision::Allow,
        Action::Update => Decision::forbid(OFFICER_STATUS_ONLY),
        Action::Delete => Decision::forbid(OFFICER_NO_DELETE),
    }
}

fn citizen(action: Action, kind: ResourceKind) -> Decision {
    if let Some(decision) = common(action, kind) {
        return decision;
    }

    match action {
        Action::List | Action::Retrieve | Action::Create | Action::Login => Decision::Allow,
        Action::UpdateStatus => Decision::forbid(STATUS_BY_STAFF),
        Action::Update | Action::Delete => Decision::forbid(CITIZEN_NO_EDIT),
    }
}

fn default_safe(action: Action, kind: ResourceKind) -> Decision {
    match kind {
        ResourceKind::Account => Decision::Allow,
        ResourceKind::Report | ResourceKind::Waste | ResourceKind::WasteType
            if action.is_read() =>
        {
            Decision::Allow
        }
        ResourceKind::Dashboard if action.is_read() => Decision::Allow,
        ResourceKind::Profile if action == Action::Retrieve => Decision::Allow,
        _ => Decision::forbid(UNRECOGNISED_ROLE),
    }
}

fn object_level(subject: &Subject, kind: ResourceKind, target: &Target) -> Decision {
    if !kind.is_owned() || (subject.is_elevated() && kind != ResourceKind::Profile) {
        return Decision::Allow;
    }

    if target.owner_id == Some(subject.identity_id) {
        Decision::Allow
    } else {
        Decision::forbid(NOT_OWNER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(role: ResolvedRole, admin_equivalent: bool) -> (Uuid, Principal) {
        let identity_id = Uuid::new_v4();
        (
            identity_id,
            Principal::Subject(Subject {
                identity_id,
                role,
                admin_equivalent,
            }),
        )
    }

    fn known(role: Role) -> (Uuid, Principal) {
        subject(ResolvedRole::Known(role), false)
    }

    fn owned_by(owner: Uuid) -> Target {
        Target {
            owner_id: Some(owner),
        }
    }

    const ALL_ACTIONS: [Action; 7] = [
        Action::List,
        Action::Retrieve,
        Action::Create,
        Action::Update,
        Action::UpdateStatus,
        Action::Delete,
        Action::Login,
    ];

    const ALL_KINDS: [ResourceKind; 6] = [
        ResourceKind::Account,
        ResourceKind::Report,
        ResourceKind::Waste,
        ResourceKind::WasteType,
        ResourceKind::Profile,
        ResourceKind::Dashboard,
    ];

    #[test]
    fn test_anonymous_reads_catalog_and_registers() {
        let p = Principal::Anonymous;
        assert!(authorize(&p, Action::List, ResourceKind::WasteType, None).is_allowed());
        assert!(authorize(&p, Action::Retrieve, ResourceKind::WasteType, None).is_allowed());
        assert!(authorize(&p, Action::Create, ResourceKind::Account, None).is_allowed());
        assert!(authorize(&p, Action::Login, ResourceKind::Account, None).is_allowed());
    }

    #[test]
    fn test_anonymous_denied_everything_needing_ownership() {
        let p = Principal::Anonymous;
        let denied = Decision::Deny(Denial::AuthenticationRequired);

        assert_eq!(authorize(&p, Action::Create, ResourceKind::WasteType, None), denied);
        assert_eq!(authorize(&p, Action::Create, ResourceKind::Report, None), denied);
        assert_eq!(authorize(&p, Action::Retrieve, ResourceKind::Report, None), denied);
        assert_eq!(authorize(&p, Action::UpdateStatus, ResourceKind::Waste, None), denied);
        assert_eq!(authorize(&p, Action::Delete, ResourceKind::Waste, None), denied);
        assert_eq!(authorize(&p, Action::List, ResourceKind::Profile, None), denied);
        assert_eq!(authorize(&p, Action::Retrieve, ResourceKind::Dashboard, None), denied);
    }

    #[test]
    fn test_admin_equivalent_allowed_everything() {
        let (_, superuser) = subject(ResolvedRole::Known(Role::Citizen), true);
        let (_, admin) = known(Role::Admin);
        let (_, unknown_staff) = subject(ResolvedRole::Unrecognized, true);
        let foreign = owned_by(Uuid::new_v4());

        for p in [&superuser, &admin, &unknown_staff] {
            for kind in ALL_KINDS {
                for action in ALL_ACTIONS {
                    assert!(authorize(p, action, kind, None).is_allowed());
                    assert!(authorize(p, action, kind, Some(&foreign)).is_allowed());
                }
            }
        }
    }

    #[test]
    fn test_officer_triages_but_cannot_edit_or_delete() {
        let (_, p) = known(Role::Officer);
        let foreign = owned_by(Uuid::new_v4());

        for kind in [ResourceKind::Report, ResourceKind::Waste] {
            assert!(authorize(&p, Action::List, kind, None).is_allowed());
            assert!(authorize(&p, Action::Retrieve, kind, Some(&foreign)).is_allowed());
            assert!(authorize(&p, Action::UpdateStatus, kind, Some(&foreign)).is_allowed());
            assert_eq!(
                authorize(&p, Action::Update, kind, Some(&foreign)),
                Decision::Deny(Denial::Forbidden(OFFICER_STATUS_ONLY))
            );
            assert_eq!(
                authorize(&p, Action::Delete, kind, Some(&foreign)),
                Decision::Deny(Denial::Forbidden(OFFICER_NO_DELETE))
            );
        }

        assert!(!authorize(&p, Action::Create, ResourceKind::Report, None).is_allowed());
        assert!(authorize(&p, Action::Create, ResourceKind::Waste, None).is_allowed());
    }

    #[test]
    fn test_officer_and_citizen_cannot_write_catalog() {
        for role in [Role::Officer, Role::Citizen] {
            let (_, p) = known(role);
            assert!(authorize(&p, Action::List, ResourceKind::WasteType, None).is_allowed());
            for action in [Action::Create, Action::Update, Action::Delete] {
                assert_eq!(
                    authorize(&p, action, ResourceKind::WasteType, None),
                    Decision::Deny(Denial::Forbidden(CATALOG_ADMIN_ONLY))
                );
            }
        }
    }

    #[test]
    fn test_citizen_creates_and_reads_own_only() {
        let (me, p) = known(Role::Citizen);
        let mine = owned_by(me);
        let theirs = owned_by(Uuid::new_v4());

        for kind in [ResourceKind::Report, ResourceKind::Waste] {
            assert!(authorize(&p, Action::Create, kind, None).is_allowed());
            assert!(authorize(&p, Action::List, kind, None).is_allowed());
            assert!(authorize(&p, Action::Retrieve, kind, Some(&mine)).is_allowed());
            assert!(!authorize(&p, Action::Retrieve, kind, Some(&theirs)).is_allowed());
        }
    }

    #[test]
    fn test_citizen_cannot_change_status_even_on_own_record() {
        let (me, p) = known(Role::Citizen);
        let mine = owned_by(me);

        assert_eq!(
            authorize(&p, Action::UpdateStatus, ResourceKind::Report, Some(&mine)),
            Decision::Deny(Denial::Forbidden(STATUS_BY_STAFF))
        );
        assert!(!authorize(&p, Action::Update, ResourceKind::Report, Some(&mine)).is_allowed());
        assert!(!authorize(&p, Action::Delete, ResourceKind::Waste, Some(&mine)).is_allowed());
    }

    #[test]
    fn test_orphaned_record_is_not_owned_by_anyone() {
        let (_, citizen) = known(Role::Citizen);
        let (_, officer) = known(Role::Officer);
        let orphan = Target { owner_id: None };

        assert!(!authorize(&citizen, Action::Retrieve, ResourceKind::Report, Some(&orphan))
            .is_allowed());
        assert!(authorize(&officer, Action::Retrieve, ResourceKind::Report, Some(&orphan))
            .is_allowed());
    }

    #[test]
    fn test_profile_access_is_self_or_admin() {
        for role in [Role::Citizen, Role::Officer] {
            let (me, p) = known(role);
            assert!(
                authorize(&p, Action::Retrieve, ResourceKind::Profile, Some(&owned_by(me)))
                    .is_allowed()
            );
            assert!(!authorize(
                &p,
                Action::Retrieve,
                ResourceKind::Profile,
                Some(&owned_by(Uuid::new_v4()))
            )
            .is_allowed());
            assert!(!authorize(&p, Action::List, ResourceKind::Profile, None).is_allowed());
            assert!(!authorize(&p, Action::Create, ResourceKind::Profile, None).is_allowed());
        }
    }

    #[test]
    fn test_unrecognised_role_gets_only_safe_reads() {
        let (me, p) = subject(ResolvedRole::Unrecognized, false);

        assert!(authorize(&p, Action::List, ResourceKind::WasteType, None).is_allowed());
        assert!(authorize(&p, Action::List, ResourceKind::Report, None).is_allowed());
        assert!(
            authorize(&p, Action::Retrieve, ResourceKind::Report, Some(&owned_by(me)))
                .is_allowed()
        );
        assert!(!authorize(
            &p,
            Action::Retrieve,
            ResourceKind::Report,
            Some(&owned_by(Uuid::new_v4()))
        )
        .is_allowed());

        for action in [
            Action::Create,
            Action::Update,
            Action::UpdateStatus,
            Action::Delete,
        ] {
            assert_eq!(
                authorize(&p, action, ResourceKind::Report, None),
                Decision::Deny(Denial::Forbidden(UNRECOGNISED_ROLE))
            );
        }
    }

    #[test]
    fn test_classify_patch() {
        assert_eq!(classify_patch(["status"]), Action::UpdateStatus);
        assert_eq!(classify_patch(["status", "location"]), Action::Update);
        assert_eq!(classify_patch(["description"]), Action::Update);
        assert_eq!(classify_patch(Vec::<&str>::new()), Action::Update);
    }
}
