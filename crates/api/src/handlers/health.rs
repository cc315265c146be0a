//! Health check endpoint.

use std::time::Duration;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// How long the health check waits for the database before reporting it
/// unhealthy. The endpoint itself always answers 200.
const DB_PING_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    db_healthy: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = tokio::time::timeout(DB_PING_TIMEOUT, shiurim_db::health_check(&state.pool))
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false);

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}
