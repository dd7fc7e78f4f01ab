mod analytics;
mod auth;
mod db;

use axum::{routing::get, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use analytics::{AnalyticsRepository, AnalyticsService};
use db::DbPool;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        analytics::handlers::get_consumption_report,
        analytics::handlers::list_kitchens,
    ),
    components(
        schemas(
            analytics::models::ConsumptionReport,
            analytics::models::KitchenConsumption,
            analytics::models::ConsumptionSummary,
            analytics::models::PeriodComparison,
            analytics::models::WasteReasonSummary,
            analytics::models::RankedItem,
            analytics::models::BreakdownBucket,
            analytics::models::BreakdownItem,
            analytics::models::ReportMetadata,
            analytics::models::Kitchen,
        )
    ),
    tags(
        (name = "analytics", description = "Consumption & waste reporting endpoints")
    ),
    info(
        title = "Kitchen Insights API",
        version = "1.0.0",
        description = "Multi-tenant consumption & waste analytics over kitchen inventory records"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub analytics_service: AnalyticsService,
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(db: DbPool) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let analytics_service = AnalyticsService::new(AnalyticsRepository::new(db.clone()));
    let state = AppState {
        db,
        analytics_service,
    };

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // API routes
        .route(
            "/api/analytics/consumption",
            get(analytics::handlers::get_consumption_report),
        )
        .route(
            "/api/analytics/kitchens",
            get(analytics::handlers::list_kitchens),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Kitchen Insights API - Starting...");

    // Get configuration from environment variables
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Create the application router
    let app = create_router(db_pool);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Kitchen Insights API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
