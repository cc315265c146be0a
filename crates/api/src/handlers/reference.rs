//! Static reference data: the level ladder and badge catalog.

use axum::Json;

use shiurim_core::badges::{Badge, BADGES};
use shiurim_core::levels::{Level, LEVELS};

/// GET /api/v1/reference/levels
pub async fn list_levels() -> Json<&'static [Level]> {
    Json(LEVELS)
}

/// GET /api/v1/reference/badges
pub async fn list_badges() -> Json<&'static [Badge]> {
    Json(BADGES)
}
