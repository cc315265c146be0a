#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::RwLock;
use tower::ServiceExt;

use shiurim_api::background::sync::SyncHandle;
use shiurim_api::config::ServerConfig;
use shiurim_api::router::build_app_router;
use shiurim_api::sessions::SessionManager;
use shiurim_api::state::AppState;
use shiurim_core::catalog::CatalogIndex;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        sync_flush_secs: 5,
    }
}

/// Build an `AppState` backed by a lazy pool that never connects.
///
/// Catalog and rewards-session endpoints are served entirely from memory,
/// so the suite runs without a live Postgres; tests seed sessions directly
/// instead of loading them from storage.
pub fn build_test_state() -> AppState {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://postgres@localhost/shiurim_test")
        .expect("lazy pool");

    AppState {
        pool,
        config: Arc::new(test_config()),
        catalog: Arc::new(RwLock::new(CatalogIndex::new())),
        sessions: Arc::new(SessionManager::new()),
        sync: SyncHandle::detached(),
    }
}

/// Build the full application router with all middleware layers, mirroring
/// the router construction in `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

pub async fn get(app: Router, uri: &str) -> Response<axum::body::Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn put_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> Response<axum::body::Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> Response<axum::body::Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<axum::body::Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: &serde_json::Value,
) -> Response<axum::body::Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
