//! Shared application router builder.
//!
//! Both the production binary (`main.rs`) and the integration tests build
//! the router here, so they exercise the exact same middleware stack.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::handlers::{catalog, health, reference, rewards};
use crate::state::AppState;

/// Build the full application [`Router`] with all middleware layers.
///
/// The middleware stack is applied bottom-up:
///
/// 1. CORS
/// 2. Set request ID on incoming requests
/// 3. Structured request/response tracing
/// 4. Propagate request ID to response
/// 5. Request timeout
/// 6. Panic recovery (catch panics, return 500)
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        // Health check at root level (not under /api/v1).
        .route("/health", get(health::health_check))
        // API v1 routes.
        .nest("/api/v1", api_routes())
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500 JSON.
        .layer(CatchPanicLayer::new())
        // Request timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // CORS.
        .layer(cors)
        // Shared state.
        .with_state(state)
}

/// All routes under `/api/v1`.
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog ingestion and derived views.
        .route("/catalog", put(catalog::replace_catalog))
        .route("/catalog/status", get(catalog::catalog_status))
        .route("/catalog/lessons", get(catalog::list_lessons))
        .route("/catalog/lessons/{id}", get(catalog::get_lesson))
        .route("/catalog/topics", get(catalog::list_topics))
        .route("/catalog/by-topic", get(catalog::lessons_by_topic))
        .route("/catalog/hebrew-months", get(catalog::list_hebrew_months))
        .route(
            "/catalog/by-hebrew-month",
            get(catalog::lessons_by_hebrew_month),
        )
        // Reference data.
        .route("/reference/levels", get(reference::list_levels))
        .route("/reference/badges", get(reference::list_badges))
        // Per-user progress and rewards.
        .route("/users/{user_id}/rewards", get(rewards::get_rewards))
        .route(
            "/users/{user_id}/rewards/snapshot",
            get(rewards::get_snapshot),
        )
        .route(
            "/users/{user_id}/rewards/import",
            post(rewards::import_state),
        )
        .route(
            "/users/{user_id}/rewards/dismiss-level-up",
            post(rewards::dismiss_level_up),
        )
        .route(
            "/users/{user_id}/rewards/dismiss-new-badge",
            post(rewards::dismiss_new_badge),
        )
        .route(
            "/users/{user_id}/module-progress",
            get(rewards::module_progress),
        )
        .route(
            "/users/{user_id}/lessons/{lesson_id}/complete",
            post(rewards::complete_lesson),
        )
        .route(
            "/users/{user_id}/lessons/{lesson_id}/watch",
            post(rewards::update_watch_progress),
        )
}

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup if any configured origin is invalid, which is the
/// desired behaviour -- we want misconfiguration to fail fast.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
