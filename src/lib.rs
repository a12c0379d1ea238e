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

// Identity, sessions and role gating.
pub mod access;
pub mod auth;
pub mod csrf;
pub mod session;

// Views and the building blocks they compose.
pub mod filters;
pub mod forms;
pub mod handlers;
pub mod listing;
pub mod redirect;
pub mod templates;

// Services and shared types.
pub mod config;
pub mod error;
pub mod locale;
pub mod models;
pub mod repository;
pub mod tasks;

// Module for routing segregation (Public, Authenticated, Admin, API).
pub mod routes;
use access::LoginRequired;
use routes::{admin, api, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use locale::LocaleService;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use session::SessionManager;

/// ApiDoc
///
/// OpenAPI document for the JSON endpoints, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::sample::list_samples, handlers::sample::retrieve_sample,
        handlers::sample::create_sample, handlers::sample::update_sample,
        handlers::sample::destroy_sample, handlers::sample::post_sample_non_generic,
        handlers::records::list_records, handlers::records::soft_delete_record,
    ),
    components(
        schemas(
            models::MessageResponse, models::SampleNonGenericRequest, models::Record,
            models::Role,
        )
    ),
    tags(
        (name = "admin-scaffold", description = "Administration scaffold API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container of every service a handler may need. Handlers
/// and extractors pull individual parts out of it through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence collaborator (Postgres or in-memory).
    pub repo: RepositoryState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Supported locales and the fallback.
    pub locales: LocaleService,
    /// Session token issuing and cookie building.
    pub sessions: SessionManager,
}

impl AppState {
    /// Builds the state from a repository and configuration, deriving the locale
    /// and session services from the configuration.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            locales: LocaleService::from_config(&config),
            sessions: SessionManager::from_config(&config),
            repo,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

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

impl FromRef<AppState> for LocaleService {
    fn from_ref(app_state: &AppState) -> LocaleService {
        app_state.locales.clone()
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(app_state: &AppState) -> SessionManager {
        app_state.sessions.clone()
    }
}

/// auth_middleware
///
/// Guards `authenticated_routes`. Extracting `LoginRequired` redirects anonymous
/// requests to the login page before the handler runs. The resolved actor is stored
/// in the request extensions so handlers read it without another lookup.
async fn auth_middleware(
    LoginRequired(actor): LoginRequired,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(actor);
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: health and the authentication flow.
        .merge(public::public_routes())
        // Sample REST resource.
        .merge(api::api_routes())
        // Authenticated Routes: any signed-in actor.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Admin Routes: the superuser check is made by each handler's extractor.
        .nest("/admin", admin::admin_routes())
        .with_state(state);

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
/// Span for every request, correlated by the `x-request-id` header.
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
