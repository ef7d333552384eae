use std::sync::Arc;

use axum::{http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
use sqlx::PgPool;

use crate::core::config::AuthConfig;
use crate::core::middleware;
use crate::features::access::AccessService;
use crate::features::auth::repositories::{
    IdentityRepository, PgIdentityRepository, PgSessionRepository, SessionRepository,
};
use crate::features::auth::{
    routes as auth_routes, AuthService, CredentialHasher, IdentityProvider, JwtValidator,
    LocalIdentityProvider, TokenService,
};
use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
use crate::features::reports::{routes as reports_routes, ReportResource, ReportService};
use crate::features::tracking::{PgTrackedRecordRepository, TrackedRecordRepository};
use crate::features::users::repositories::{PgProfileRepository, ProfileRepository};
use crate::features::users::{routes as users_routes, UserProfileService};
use crate::features::waste_types::repositories::{PgWasteTypeRepository, WasteTypeRepository};
use crate::features::waste_types::{routes as waste_types_routes, WasteTypeService};
use crate::features::wastes::{routes as wastes_routes, WasteResource, WasteService};

/// Storage backends for every feature
#[derive(Clone)]
pub struct Repositories {
    pub identities: Arc<dyn IdentityRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub reports: Arc<dyn TrackedRecordRepository<ReportResource>>,
    pub wastes: Arc<dyn TrackedRecordRepository<WasteResource>>,
    pub waste_types: Arc<dyn WasteTypeRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            identities: Arc::new(PgIdentityRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool.clone())),
            profiles: Arc::new(PgProfileRepository::new(pool.clone())),
            reports: Arc::new(PgTrackedRecordRepository::<ReportResource>::new(pool.clone())),
            wastes: Arc::new(PgTrackedRecordRepository::<WasteResource>::new(pool.clone())),
            waste_types: Arc::new(PgWasteTypeRepository::new(pool)),
        }
    }
}

/// Fully wired services shared by all handlers
#[derive(Clone)]
pub struct AppServices {
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub user_profiles: Arc<UserProfileService>,
    pub auth: Arc<AuthService>,
    pub reports: Arc<ReportService>,
    pub wastes: Arc<WasteService>,
    pub waste_types: Arc<WasteTypeService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(repositories: Repositories, auth: &AuthConfig, hasher: CredentialHasher) -> Self {
        let identity_provider: Arc<dyn IdentityProvider> = Arc::new(LocalIdentityProvider::new(
            Arc::clone(&repositories.identities),
            Arc::clone(&repositories.sessions),
            TokenService::new(auth.clone()),
            JwtValidator::new(&auth.jwt_secret, auth.issuer.clone(), auth.jwt_leeway),
            hasher,
        ));

        let access = Arc::new(AccessService::new(Arc::clone(&repositories.profiles)));
        let user_profiles = Arc::new(UserProfileService::new(
            Arc::clone(&repositories.profiles),
            Arc::clone(&repositories.identities),
            Arc::clone(&access),
        ));
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&identity_provider),
            Arc::clone(&repositories.identities),
            Arc::clone(&user_profiles),
            Arc::clone(&access),
        ));

        let reports = Arc::new(ReportService::new(
            repositories.reports,
            Arc::clone(&access),
        ));
        let wastes = Arc::new(WasteService::new(repositories.wastes, Arc::clone(&access)));
        let waste_types = Arc::new(WasteTypeService::new(
            repositories.waste_types,
            Arc::clone(&access),
        ));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&reports),
            Arc::clone(&waste_types),
            Arc::clone(&access),
        ));

        Self {
            identity_provider,
            user_profiles,
            auth: auth_service,
            reports,
            wastes,
            waste_types,
            dashboard,
        }
    }
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All API routes behind requester resolution, plus the health probe
pub fn api_router(services: &AppServices) -> Router {
    let api = Router::new()
        .merge(auth_routes::routes(Arc::clone(&services.auth)))
        .merge(users_routes::routes(Arc::clone(&services.user_profiles)))
        .merge(reports_routes::routes(Arc::clone(&services.reports)))
        .merge(wastes_routes::routes(Arc::clone(&services.wastes)))
        .merge(waste_types_routes::routes(Arc::clone(&services.waste_types)))
        .merge(dashboard_routes::routes(Arc::clone(&services.dashboard)))
        .route_layer(from_fn_with_state(
            Arc::clone(&services.identity_provider),
            middleware::identify_requester,
        ));

    Router::new()
        .merge(api)
        .merge(auth_routes::session_routes(Arc::clone(&services.auth)))
        .route("/health", get(health_check))
}
