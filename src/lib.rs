use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
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
pub mod merge;
pub mod models;
pub mod password;
pub mod policy;
pub mod repository;
pub mod service;
pub mod validate;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point.
pub use config::AppConfig;
pub use password::{Argon2Hasher, HasherState, MockHasher};
pub use repository::{PostgresRepository, RepositoryState};
pub use service::UserService;

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation for the application, aggregating
/// every handler decorated with `#[utoipa::path]` and the schemas used in
/// request/response bodies. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_users, handlers::get_user, handlers::create_user,
        handlers::patch_user, handlers::replace_user, handlers::delete_user,
    ),
    components(
        schemas(
            models::Role, models::UserOut, models::UserPage, models::PageInfo,
            models::CreateUserRequest, models::UpdateUserRequest,
            models::ReplaceUserRequest, validate::FieldError,
        )
    ),
    tags(
        (name = "user-vault", description = "Role-gated user management API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Orchestration layer: authorize → merge → validate → persist pipelines.
    pub service: UserService,
    /// Repository layer: used directly by the identity extractor.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These let extractors (notably AuthUser) pull individual components out of
// the shared AppState without depending on the whole struct.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the authenticated route group by attempting the
/// `AuthUser` extraction up front. If credential resolution fails the extractor
/// rejects with 401 before any handler runs; handlers then re-receive the
/// already-resolved identity through their own `AuthUser` argument.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's routing structure, applies global and scoped
/// middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Authenticated routes: credential resolution happens in the layer,
        // per-operation authorization in the access policy.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    // Observability and correlation layers, applied outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: wraps the request/response lifecycle in a
                // span correlated by the generated request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes span creation for `TraceLayer`: extracts the `x-request-id`
/// header (if present) and records it alongside the HTTP method and URI so
/// every log line of a request shares one correlation id.
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
