//! In-memory stores and a fully wired service graph for unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use argon2::Params;
use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::app::{api_router, AppServices, Repositories};
use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::access::{QuerySpec, SortField, Visibility};
use crate::features::auth::dtos::LoginRequestDto;
use crate::features::auth::model::{
    AuthenticatedUser, Identity, NewIdentity, Requester, SessionTokens,
};
use crate::features::auth::repositories::{IdentityRepository, SessionRepository};
use crate::features::auth::{AuthService, CredentialHasher, IdentityProvider};
use crate::features::dashboard::DashboardService;
use crate::features::reports::{ReportResource, ReportService};
use crate::features::tracking::record::NewTrackedRecord;
use crate::features::tracking::{
    OwnerSummary, StatusLifecycle, TrackedRecord, TrackedRecordRepository, TrackedResource,
};
use crate::features::users::models::{Profile, ProfileSeed, Role, UpdateProfile};
use crate::features::users::repositories::ProfileRepository;
use crate::features::users::UserProfileService;
use crate::features::waste_types::models::{WasteType, WasteTypeFields};
use crate::features::waste_types::repositories::WasteTypeRepository;
use crate::features::waste_types::WasteTypeService;
use crate::features::wastes::{WasteResource, WasteService};
use crate::shared::types::PaginationQuery;

pub fn authenticated(identity_id: Uuid, admin_equivalent: bool) -> AuthenticatedUser {
    AuthenticatedUser {
        identity_id,
        username: format!("user-{}", identity_id.simple()),
        email: String::new(),
        is_superuser: admin_equivalent,
        is_staff: false,
        session_id: None,
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-that-is-at-least-32-bytes-long".to_string(),
        issuer: "wastetrack-test".to_string(),
        access_token_ttl: Duration::from_secs(900),
        refresh_token_ttl: Duration::from_secs(86400),
        jwt_leeway: Duration::from_secs(0),
    }
}

fn storage_unavailable() -> AppError {
    AppError::Internal("storage unavailable".to_string())
}

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<Vec<Profile>>,
    failing: AtomicBool,
}

impl InMemoryProfileRepository {
    /// Make every read fail as if the store were down
    pub fn fail_reads(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    /// Store a profile with an arbitrary role string
    pub fn insert_raw(&self, identity_id: Uuid, role: &str) -> Profile {
        let profile = Profile {
            id: Uuid::new_v4(),
            identity_id,
            role: role.to_string(),
            phone_number: String::new(),
            location: None,
            created_at: Utc::now(),
        };
        self.profiles.lock().unwrap().push(profile.clone());
        profile
    }

    pub fn count(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    fn check_reads(&self) -> Result<()> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(storage_unavailable());
        }
        Ok(())
    }

    fn insert_seed(&self, identity_id: Uuid, seed: ProfileSeed) -> Result<Profile> {
        let mut profiles = self.profiles.lock().unwrap();
        if profiles.iter().any(|p| p.identity_id == identity_id) {
            return Err(AppError::Conflict("identity_id".to_string()));
        }
        let profile = Profile {
            id: Uuid::new_v4(),
            identity_id,
            role: seed.role.as_str().to_string(),
            phone_number: seed.phone_number,
            location: seed.location,
            created_at: Utc::now(),
        };
        profiles.push(profile.clone());
        Ok(profile)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_identity(&self, identity_id: Uuid) -> Result<Option<Profile>> {
        self.check_reads()?;
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter().find(|p| p.identity_id == identity_id).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        self.check_reads()?;
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn list(
        &self,
        visibility: &Visibility,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Profile>, i64)> {
        self.check_reads()?;
        let mut visible: Vec<Profile> = self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| visibility.permits(Some(p.identity_id)))
            .cloned()
            .collect();
        visible.reverse();
        let total = visible.len() as i64;
        Ok((page(visible, limit, offset), total))
    }

    async fn get_or_create(&self, identity_id: Uuid, seed: ProfileSeed) -> Result<(Profile, bool)> {
        if let Some(existing) = self.find_by_identity(identity_id).await? {
            return Ok((existing, false));
        }
        Ok((self.insert_seed(identity_id, seed)?, true))
    }

    async fn create(&self, identity_id: Uuid, seed: ProfileSeed) -> Result<Profile> {
        self.insert_seed(identity_id, seed)
    }

    async fn set_role(&self, identity_id: Uuid, role: Role) -> Result<Profile> {
        {
            let mut profiles = self.profiles.lock().unwrap();
            if let Some(profile) = profiles.iter_mut().find(|p| p.identity_id == identity_id) {
                profile.role = role.as_str().to_string();
                return Ok(profile.clone());
            }
        }
        self.insert_seed(identity_id, ProfileSeed::default_for(role))
    }

    async fn update(&self, id: Uuid, changes: UpdateProfile) -> Result<Option<Profile>> {
        let mut profiles = self.profiles.lock().unwrap();
        let Some(profile) = profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(role) = changes.role {
            profile.role = role.as_str().to_string();
        }
        if let Some(phone_number) = changes.phone_number {
            profile.phone_number = phone_number;
        }
        if let Some(location) = changes.location {
            profile.location = Some(location);
        }
        Ok(Some(profile.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut profiles = self.profiles.lock().unwrap();
        let before = profiles.len();
        profiles.retain(|p| p.id != id);
        Ok(profiles.len() < before)
    }
}

pub struct InMemoryIdentityRepository {
    identities: Mutex<Vec<Identity>>,
    profiles: Arc<InMemoryProfileRepository>,
    pending_conflict: Mutex<Option<String>>,
}

impl InMemoryIdentityRepository {
    pub fn new(profiles: Arc<InMemoryProfileRepository>) -> Self {
        Self {
            identities: Mutex::new(Vec::new()),
            profiles,
            pending_conflict: Mutex::new(None),
        }
    }

    pub fn count(&self) -> usize {
        self.identities.lock().unwrap().len()
    }

    pub fn set_active(&self, id: Uuid, active: bool) {
        let mut identities = self.identities.lock().unwrap();
        if let Some(identity) = identities.iter_mut().find(|i| i.id == id) {
            identity.is_active = active;
        }
    }

    /// Fail the next insert as if a concurrent writer took `field` first
    pub fn conflict_next_create(&self, field: &str) {
        *self.pending_conflict.lock().unwrap() = Some(field.to_string());
    }

    /// Store an identity directly, bypassing uniqueness checks and profiles
    pub fn insert(&self, identity: NewIdentity) -> Identity {
        let identity = Identity {
            id: Uuid::new_v4(),
            username: identity.username,
            email: identity.email,
            password_hash: identity.password_hash,
            first_name: identity.first_name,
            last_name: identity.last_name,
            is_superuser: identity.is_superuser,
            is_staff: identity.is_staff,
            is_active: true,
        };
        self.identities.lock().unwrap().push(identity.clone());
        identity
    }

    fn owner_summary(&self, id: Uuid) -> Option<OwnerSummary> {
        let identities = self.identities.lock().unwrap();
        identities.iter().find(|i| i.id == id).map(|i| OwnerSummary {
            id: i.id,
            username: i.username.clone(),
            email: i.email.clone(),
        })
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        let identities = self.identities.lock().unwrap();
        Ok(identities.iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>> {
        let identities = self.identities.lock().unwrap();
        Ok(identities.iter().find(|i| i.username == username).cloned())
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        let identities = self.identities.lock().unwrap();
        Ok(identities
            .iter()
            .any(|i| i.username.to_lowercase() == username.to_lowercase()))
    }

    async fn email_taken(&self, email: &str) -> Result<bool> {
        if email.is_empty() {
            return Ok(false);
        }
        let identities = self.identities.lock().unwrap();
        Ok(identities
            .iter()
            .any(|i| i.email.to_lowercase() == email.to_lowercase()))
    }

    async fn create_with_profile(
        &self,
        identity: NewIdentity,
        profile: ProfileSeed,
    ) -> Result<(Identity, Profile)> {
        let pending = self.pending_conflict.lock().unwrap().take();
        if let Some(field) = pending {
            return Err(AppError::Conflict(field));
        }
        if self.username_taken(&identity.username).await? {
            return Err(AppError::Conflict("username".to_string()));
        }
        if self.email_taken(&identity.email).await? {
            return Err(AppError::Conflict("email".to_string()));
        }

        let identity = self.insert(identity);
        let profile = self.profiles.insert_seed(identity.id, profile)?;
        Ok((identity, profile))
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    revoked: Mutex<HashMap<Uuid, DateTime<Utc>>>,
}

impl InMemorySessionRepository {
    pub fn count(&self) -> usize {
        self.revoked.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn revoke(
        &self,
        session_id: Uuid,
        _identity_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.revoked
            .lock()
            .unwrap()
            .entry(session_id)
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, session_id: Uuid) -> Result<bool> {
        Ok(self.revoked.lock().unwrap().contains_key(&session_id))
    }

    async fn purge_expired(&self) -> Result<u64> {
        let mut revoked = self.revoked.lock().unwrap();
        let before = revoked.len();
        let now = Utc::now();
        revoked.retain(|_, expires_at| *expires_at >= now);
        Ok((before - revoked.len()) as u64)
    }
}

/// Tracked records kept in insertion order; owners resolve through the identity store
pub struct InMemoryTrackedRecordRepository<R: TrackedResource> {
    records: Mutex<Vec<TrackedRecord<R>>>,
    identities: Arc<InMemoryIdentityRepository>,
}

impl<R: TrackedResource> InMemoryTrackedRecordRepository<R> {
    pub fn new(identities: Arc<InMemoryIdentityRepository>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            identities,
        }
    }

    fn with_owner(&self, mut record: TrackedRecord<R>) -> TrackedRecord<R> {
        record.owner = record
            .owner_id
            .and_then(|id| self.identities.owner_summary(id));
        record
    }
}

#[async_trait]
impl<R: TrackedResource> TrackedRecordRepository<R> for InMemoryTrackedRecordRepository<R> {
    async fn list(&self, spec: &QuerySpec<R::Status>) -> Result<(Vec<TrackedRecord<R>>, i64)> {
        let term = spec.search_term().map(str::to_lowercase);
        let mut matching: Vec<TrackedRecord<R>> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| spec.visibility.permits(r.owner_id))
            .filter(|r| spec.filters.status.map_or(true, |s| r.status == s))
            .filter(|r| match &term {
                Some(term) => {
                    r.waste_type.to_lowercase().contains(term)
                        || r.location.to_lowercase().contains(term)
                }
                None => true,
            })
            .cloned()
            .collect();

        let ordering = spec.filters.ordering;
        matching.sort_by(|a, b| {
            let ordered = match ordering.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            };
            if ordering.descending {
                ordered.reverse()
            } else {
                ordered
            }
        });

        let total = matching.len() as i64;
        let pagination = &spec.filters.pagination;
        let records = page(matching, pagination.limit(), pagination.offset())
            .into_iter()
            .map(|r| self.with_owner(r))
            .collect();
        Ok((records, total))
    }

    async fn find(&self, id: Uuid, visibility: &Visibility) -> Result<Option<TrackedRecord<R>>> {
        let found = self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && visibility.permits(r.owner_id))
            .cloned();
        Ok(found.map(|r| self.with_owner(r)))
    }

    async fn insert(&self, record: NewTrackedRecord<R>) -> Result<TrackedRecord<R>> {
        let record = TrackedRecord {
            id: Uuid::new_v4(),
            owner_id: Some(record.owner_id),
            owner: None,
            waste_type: record.waste_type,
            location: record.location,
            status: record.status,
            details: record.details,
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(self.with_owner(record))
    }

    async fn save(&self, record: &TrackedRecord<R>) -> Result<Option<TrackedRecord<R>>> {
        let saved = {
            let mut records = self.records.lock().unwrap();
            let Some(stored) = records.iter_mut().find(|r| r.id == record.id) else {
                return Ok(None);
            };
            stored.waste_type = record.waste_type.clone();
            stored.location = record.location.clone();
            stored.status = record.status;
            stored.details = record.details.clone();
            stored.clone()
        };
        Ok(Some(self.with_owner(saved)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn count(&self, status: Option<R::Status>) -> Result<i64> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .count() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryWasteTypeRepository {
    waste_types: Mutex<Vec<WasteType>>,
}

#[async_trait]
impl WasteTypeRepository for InMemoryWasteTypeRepository {
    async fn list(
        &self,
        search: Option<&str>,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<WasteType>, i64)> {
        let term = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());
        let mut matching: Vec<WasteType> = self
            .waste_types
            .lock()
            .unwrap()
            .iter()
            .filter(|t| match &term {
                Some(term) => t.name.to_lowercase().contains(term),
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));

        let total = matching.len() as i64;
        Ok((page(matching, pagination.limit(), pagination.offset()), total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<WasteType>> {
        let waste_types = self.waste_types.lock().unwrap();
        Ok(waste_types.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, fields: WasteTypeFields) -> Result<WasteType> {
        let waste_type = WasteType {
            id: Uuid::new_v4(),
            name: fields.name,
            description: fields.description,
        };
        self.waste_types.lock().unwrap().push(waste_type.clone());
        Ok(waste_type)
    }

    async fn update(&self, id: Uuid, fields: WasteTypeFields) -> Result<Option<WasteType>> {
        let mut waste_types = self.waste_types.lock().unwrap();
        let Some(waste_type) = waste_types.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        waste_type.name = fields.name;
        waste_type.description = fields.description;
        Ok(Some(waste_type.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut waste_types = self.waste_types.lock().unwrap();
        let before = waste_types.len();
        waste_types.retain(|t| t.id != id);
        Ok(waste_types.len() < before)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.waste_types.lock().unwrap().len() as i64)
    }
}

/// Services wired over in-memory stores, with handles on the stores themselves
pub struct TestContext {
    pub identities: Arc<InMemoryIdentityRepository>,
    pub profiles: Arc<InMemoryProfileRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub user_profiles: Arc<UserProfileService>,
    pub auth: Arc<AuthService>,
    pub reports: Arc<ReportService>,
    pub wastes: Arc<WasteService>,
    pub waste_types: Arc<WasteTypeService>,
    pub dashboard: Arc<DashboardService>,
    services: AppServices,
    hasher: CredentialHasher,
}

impl TestContext {
    pub fn new() -> Self {
        let profiles = Arc::new(InMemoryProfileRepository::default());
        let identities = Arc::new(InMemoryIdentityRepository::new(Arc::clone(&profiles)));
        let sessions = Arc::new(InMemorySessionRepository::default());

        let repositories = Repositories {
            identities: identities.clone(),
            sessions: sessions.clone(),
            profiles: profiles.clone(),
            reports: Arc::new(InMemoryTrackedRecordRepository::<ReportResource>::new(
                Arc::clone(&identities),
            )),
            wastes: Arc::new(InMemoryTrackedRecordRepository::<WasteResource>::new(
                Arc::clone(&identities),
            )),
            waste_types: Arc::new(InMemoryWasteTypeRepository::default()),
        };

        // Cheapest argon2 parameters keep hashing fast in tests
        let hasher = CredentialHasher::new(Params::new(8, 1, 1, None).unwrap());
        let services = AppServices::new(repositories, &test_auth_config(), hasher.clone());

        Self {
            identities,
            profiles,
            sessions,
            identity_provider: Arc::clone(&services.identity_provider),
            user_profiles: Arc::clone(&services.user_profiles),
            auth: Arc::clone(&services.auth),
            reports: Arc::clone(&services.reports),
            wastes: Arc::clone(&services.wastes),
            waste_types: Arc::clone(&services.waste_types),
            dashboard: Arc::clone(&services.dashboard),
            services,
            hasher,
        }
    }

    fn new_identity(&self, username: &str, password: &str, superuser: bool) -> NewIdentity {
        NewIdentity {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: self.hasher.hash(password).unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            is_superuser: superuser,
            is_staff: false,
        }
    }

    /// Identity with a profile: admin for superusers, citizen otherwise
    pub async fn seed_identity(&self, username: &str, password: &str, superuser: bool) -> Identity {
        let role = if superuser { Role::Admin } else { Role::Citizen };
        let (identity, _) = self
            .identities
            .create_with_profile(
                self.new_identity(username, password, superuser),
                ProfileSeed::default_for(role),
            )
            .await
            .unwrap();
        identity
    }

    /// Identity created before profiles existed
    pub fn seed_identity_without_profile(&self, username: &str, password: &str, superuser: bool) -> Identity {
        self.identities
            .insert(self.new_identity(username, password, superuser))
    }

    /// Regular identity with the given role; the password is `<username>-password`
    pub async fn seed_with_role(&self, username: &str, role: Role) -> Identity {
        let password = format!("{}-password", username);
        let (identity, _) = self
            .identities
            .create_with_profile(
                self.new_identity(username, &password, false),
                ProfileSeed::default_for(role),
            )
            .await
            .unwrap();
        identity
    }

    /// Requester as it would be resolved from a token, minus the session
    pub fn requester(&self, identity: &Identity) -> Requester {
        Requester::Authenticated(AuthenticatedUser::from_identity(identity, None))
    }

    /// Log in through the auth service and resolve the issued access token
    pub async fn login(&self, identity: &Identity, password: &str) -> (Requester, SessionTokens) {
        let response = self
            .auth
            .login(
                &Requester::Anonymous,
                LoginRequestDto {
                    username: identity.username.clone(),
                    password: password.to_string(),
                },
            )
            .await
            .unwrap();

        let header = format!("Bearer {}", response.tokens.access);
        let requester = self
            .identity_provider
            .current_requester(Some(&header))
            .await
            .unwrap();
        (requester, response.tokens)
    }

    /// API router over the same services
    pub fn router(&self) -> Router {
        api_router(&self.services)
    }
}
