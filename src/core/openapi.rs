use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::tracking::OwnerSummary;
use crate::features::users::{dtos as users_dtos, handlers as users_handlers, models::Role};
use crate::features::waste_types::{dtos as waste_types_dtos, handlers as waste_types_handlers};
use crate::features::wastes::{
    dtos as wastes_dtos, handlers as wastes_handlers, models as wastes_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::refresh_token,
        auth::handlers::get_me,
        // Profiles
        users_handlers::get_my_profile,
        users_handlers::list_profiles,
        users_handlers::create_profile,
        users_handlers::get_profile,
        users_handlers::update_profile,
        users_handlers::delete_profile,
        // Reports
        reports_handlers::list_reports,
        reports_handlers::create_report,
        reports_handlers::get_report,
        reports_handlers::update_report,
        reports_handlers::update_report_status,
        reports_handlers::delete_report,
        // Wastes
        wastes_handlers::list_wastes,
        wastes_handlers::create_waste,
        wastes_handlers::get_waste,
        wastes_handlers::update_waste,
        wastes_handlers::update_waste_status,
        wastes_handlers::delete_waste,
        // Waste types
        waste_types_handlers::list_waste_types,
        waste_types_handlers::get_waste_type,
        waste_types_handlers::create_waste_type,
        waste_types_handlers::update_waste_type,
        waste_types_handlers::delete_waste_type,
        // Dashboard
        dashboard_handlers::get_summary,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Role,
            OwnerSummary,
            // Auth
            auth::model::SessionTokens,
            auth::dtos::RegisterRequestDto,
            auth::dtos::RegisterResponseDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::LoginResponseDto,
            auth::dtos::RefreshTokenRequestDto,
            auth::dtos::UserSummaryDto,
            auth::dtos::MeResponseDto,
            ApiResponse<auth::dtos::RegisterResponseDto>,
            ApiResponse<auth::dtos::LoginResponseDto>,
            ApiResponse<auth::dtos::MeResponseDto>,
            ApiResponse<auth::model::SessionTokens>,
            // Profiles
            users_dtos::ProfileResponseDto,
            users_dtos::CreateProfileDto,
            users_dtos::UpdateProfileDto,
            ApiResponse<users_dtos::ProfileResponseDto>,
            ApiResponse<Vec<users_dtos::ProfileResponseDto>>,
            // Reports
            reports_models::ReportStatus,
            reports_dtos::CreateReportDto,
            reports_dtos::UpdateReportDto,
            reports_dtos::UpdateReportStatusDto,
            reports_dtos::ReportResponseDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            // Wastes
            wastes_models::WasteStatus,
            wastes_dtos::CreateWasteDto,
            wastes_dtos::UpdateWasteDto,
            wastes_dtos::UpdateWasteStatusDto,
            wastes_dtos::WasteResponseDto,
            ApiResponse<wastes_dtos::WasteResponseDto>,
            ApiResponse<Vec<wastes_dtos::WasteResponseDto>>,
            // Waste types
            waste_types_dtos::WasteTypeRequestDto,
            waste_types_dtos::WasteTypeResponseDto,
            ApiResponse<waste_types_dtos::WasteTypeResponseDto>,
            ApiResponse<Vec<waste_types_dtos::WasteTypeResponseDto>>,
            // Dashboard
            dashboard_dtos::DashboardSummaryDto,
            ApiResponse<dashboard_dtos::DashboardSummaryDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and sessions"),
        (name = "profiles", description = "Role-carrying user profiles"),
        (name = "reports", description = "Citizen waste reports"),
        (name = "wastes", description = "Collected waste records"),
        (name = "waste-types", description = "Waste type catalog (writes admin only)"),
        (name = "dashboard", description = "Aggregate statistics"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Wastetrack API",
        version = "0.1.0",
        description = "API documentation for Wastetrack",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
