use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    routing::{get, post},
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

// Navigation core: route table, guard, landing resolution.
pub mod guard;
pub mod landing;
pub mod routes;

// Collaborators: the session store and the backend identity endpoint.
pub mod identity;
pub mod store;

pub mod config;
pub mod handlers;
pub mod models;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use guard::{MismatchPolicy, Navigator, evaluate};
pub use identity::{HttpIdentityClient, IdentityService, IdentityState, MockIdentityService};
pub use models::{Decision, Role, Session};
pub use routes::RouteTable;
pub use store::{IdentityStore, MemoryStore};

/// ApiDoc
///
/// OpenAPI description of the navigation service, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::list_routes, handlers::navigate),
    components(
        schemas(
            models::Role, models::Decision, models::NavigateRequest,
            models::NavigateResponse, models::RouteInfo,
        )
    ),
    tags(
        (name = "portal-guard", description = "School portal navigation guard")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared state of the navigation service: the navigator (route table, identity client,
/// mismatch policy) and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub navigator: Navigator,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state from a configuration and an identity service.
    pub fn new(config: AppConfig, identity: IdentityState) -> Self {
        Self {
            navigator: Navigator::new(identity, config.mismatch_policy),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for Navigator {
    fn from_ref(app_state: &AppState) -> Navigator {
        app_state.navigator.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the navigation service's routes, applies the observability layers and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration: the web front end calls this service from the browser.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Correlation header shared by the request-id layers and the span factory.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    // The service is stateless: every decision is computed from the store snapshot the
    // caller sends, so no route needs an authentication layer of its own.
    let base_router = Router::new()
        // Documentation: Swagger UI over the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // GET /health
        // Liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET /routes
        // Read-only listing of the route table, used by the front end to mirror its access
        // metadata.
        .route("/routes", get(handlers::list_routes))
        // POST /navigate
        // Evaluates one navigation against the caller's store snapshot.
        .route("/navigate", post(handlers::navigate))
        // Shared navigator and configuration for every handler.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming navigation request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, carrying the request id so the
                // guard's redirect and refresh logs can be grouped.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echoes x-request-id back to the front end.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (applied last)
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: HTTP method, URI and the `x-request-id` header, so
/// every guard log line of one request is correlated.
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
