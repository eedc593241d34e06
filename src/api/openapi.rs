//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, health, photos, stats, visits};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FieldLog API",
        version = "1.0.0",
        description = "Field Sales Visit Tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "FieldLog Team", email = "dev@fieldlog.app")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Visits
        visits::list_visits,
        visits::cloud_visits,
        visits::local_visits,
        visits::create_visit,
        visits::get_visit,
        visits::update_visit,
        visits::delete_visit,
        visits::patch_area_code,
        // Stats
        stats::get_customer_stats,
        stats::get_overdue,
        // Photos
        photos::upload_photo,
    ),
    components(
        schemas(
            // Auth
            crate::models::rep::LoginRequest,
            crate::models::rep::RepProfile,
            auth::LoginResponse,
            // Visits
            crate::models::visit::Visit,
            crate::models::visit::VisitPayload,
            crate::models::visit::AreaCodePatch,
            crate::models::visit::LeadRating,
            visits::CloudVisitsResponse,
            visits::CreateVisitResponse,
            // Stats
            crate::models::stats::PharmacyStats,
            crate::analysis::overdue::AreaGroup,
            crate::analysis::overdue::OverdueReport,
            stats::CustomerStatsQuery,
            stats::CustomerStatsResponse,
            stats::OverdueResponse,
            // Photos
            photos::PhotoUploadRequest,
            photos::PhotoUploadResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Rep authentication"),
        (name = "visits", description = "Visit records"),
        (name = "stats", description = "Customer statistics"),
        (name = "photos", description = "Visit photos"),
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
