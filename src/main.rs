//! FieldLog Server - Field Sales Visit Tracking
//!
//! A REST API server for recording pharmacy visits and deriving
//! per-pharmacy statistics.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fieldlog_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("fieldlog_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    // The appender guard must outlive the server so buffered logs flush
    let _appender_guard = match &config.logging.directory {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "fieldlog.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    };

    tracing::info!("Starting FieldLog Server v{}", env!("CARGO_PKG_VERSION"));

    if config.sheets.visits_spreadsheet_id.is_none() {
        tracing::warn!("Visit store not configured; running in local-only mode");
    }

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(&config);
    let services = Services::new(repository, config.auth.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Visits
        .route("/visits", get(api::visits::list_visits))
        .route("/visits", post(api::visits::create_visit))
        .route("/visits/cloud", get(api::visits::cloud_visits))
        .route("/visits/local", get(api::visits::local_visits))
        .route("/visits/:id", get(api::visits::get_visit))
        .route("/visits/:id", put(api::visits::update_visit))
        .route("/visits/:id", delete(api::visits::delete_visit))
        .route("/visits/:id/area-code", patch(api::visits::patch_area_code))
        // Statistics
        .route("/customers/stats", get(api::stats::get_customer_stats))
        .route("/customers/overdue", get(api::stats::get_overdue))
        // Photos
        .route("/photos", post(api::photos::upload_photo))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
