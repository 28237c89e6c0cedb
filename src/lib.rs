use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod resources;
pub mod seed;
pub mod storage;

// Routing split by access level (public, admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, public};
// Aliased: utoipa treats any path ending in `Value` as `serde_json::Value`.
use models::Value as ValueModel;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use resources::ResourceKind;
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document for the `/api` surface, served at `/api-docs/openapi.json`
/// and browsable through Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::register, handlers::create_contact_message,
        handlers::list_page_content, handlers::get_page_content, handlers::put_page_content,
        handlers::admin_list_resources, handlers::admin_create_resource,
        handlers::admin_update_resource, handlers::admin_delete_resource,
        handlers::list_messages, handlers::mark_message_read, handlers::delete_message,
        handlers::upload_image
    ),
    components(
        schemas(
            models::Service, models::Testimonial, models::GalleryImage, models::GalleryCategory,
            models::Stat, ValueModel, models::ContactInfo, models::ContactMessage,
            models::SiteContent, models::LoginRequest, models::RegisterRequest,
            models::ContactMessageRequest, models::PageContentUpdate, models::UserSummary,
            models::AuthResponse, models::ContactMessageCreated, models::SuccessResponse,
            models::UploadResponse, resources::ServiceInput, resources::TestimonialInput,
            resources::GalleryImageInput, resources::StatInput, resources::ValueInput,
            resources::ContactInfoInput,
        )
    ),
    tags(
        (name = "amarea-site", description = "Amarea wedding planner site API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of services and configuration, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: Postgres in production, in-memory in tests.
    pub repo: RepositoryState,
    /// Object store receiving uploaded images.
    pub storage: StorageState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Route layer for the admin router. Extracting `AuthUser` runs the bearer-token
/// check; on failure the extractor's 401 is returned and the handler never runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the full routing tree, the middleware stack and the shared state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. /api: public routes plus the token-guarded admin router.
    let api = public::public_routes().nest(
        "/admin",
        admin::admin_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        )),
    );

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with method, URI and the `x-request-id`
/// set by `SetRequestIdLayer`, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
