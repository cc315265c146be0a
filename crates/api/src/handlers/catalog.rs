//! Handlers for the `/catalog` resource.
//!
//! The catalog loader PUTs fully-formed lesson records here; everything
//! else is a read-only derived view over the in-memory index. Records are
//! validated once, at this boundary, into the strict core type.

use axum::extract::{Path, State};
use axum::Json;
use indexmap::IndexMap;
use serde::Serialize;

use shiurim_core::error::CoreError;
use shiurim_core::lesson::{Lesson, LessonRecord};

use crate::error::AppResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ReplaceCatalogResponse {
    pub lessons: usize,
}

#[derive(Serialize)]
pub struct CatalogStatusResponse {
    pub loaded: bool,
    pub lessons: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// PUT /api/v1/catalog
///
/// Atomically replace the whole catalog. Any invalid record rejects the
/// request; a partially applied refresh would be worse than a stale one.
pub async fn replace_catalog(
    State(state): State<AppState>,
    Json(records): Json<Vec<LessonRecord>>,
) -> AppResult<Json<ReplaceCatalogResponse>> {
    let lessons = records
        .into_iter()
        .map(LessonRecord::try_into_lesson)
        .collect::<Result<Vec<Lesson>, CoreError>>()?;

    let count = lessons.len();
    state.catalog.write().await.replace(lessons);
    tracing::info!(lessons = count, "Catalog replaced");

    Ok(Json(ReplaceCatalogResponse { lessons: count }))
}

/// GET /api/v1/catalog/status
pub async fn catalog_status(State(state): State<AppState>) -> Json<CatalogStatusResponse> {
    let catalog = state.catalog.read().await;
    Json(CatalogStatusResponse {
        loaded: catalog.is_loaded(),
        lessons: catalog.all().len(),
    })
}

/// GET /api/v1/catalog/lessons
///
/// All lessons in original catalog order.
pub async fn list_lessons(State(state): State<AppState>) -> Json<Vec<Lesson>> {
    Json(state.catalog.read().await.all().to_vec())
}

/// GET /api/v1/catalog/lessons/{id}
pub async fn get_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Lesson>> {
    let catalog = state.catalog.read().await;
    let lesson = catalog
        .find(&id)
        .cloned()
        .ok_or(CoreError::NotFound { entity: "Lesson", id })?;
    Ok(Json(lesson))
}

/// GET /api/v1/catalog/topics
///
/// Distinct topics in first-appearance order.
pub async fn list_topics(State(state): State<AppState>) -> Json<Vec<String>> {
    let catalog = state.catalog.read().await;
    Json(catalog.topics().into_iter().map(String::from).collect())
}

/// GET /api/v1/catalog/by-topic
pub async fn lessons_by_topic(
    State(state): State<AppState>,
) -> Json<IndexMap<String, Vec<Lesson>>> {
    let catalog = state.catalog.read().await;
    Json(to_owned_groups(catalog.by_topic()))
}

/// GET /api/v1/catalog/hebrew-months
pub async fn list_hebrew_months(State(state): State<AppState>) -> Json<Vec<String>> {
    let catalog = state.catalog.read().await;
    Json(
        catalog
            .hebrew_month_years()
            .into_iter()
            .map(String::from)
            .collect(),
    )
}

/// GET /api/v1/catalog/by-hebrew-month
pub async fn lessons_by_hebrew_month(
    State(state): State<AppState>,
) -> Json<IndexMap<String, Vec<Lesson>>> {
    let catalog = state.catalog.read().await;
    Json(to_owned_groups(catalog.by_hebrew_month()))
}

/// Detach grouped views from the index borrow for serialization.
fn to_owned_groups(groups: IndexMap<String, Vec<&Lesson>>) -> IndexMap<String, Vec<Lesson>> {
    groups
        .into_iter()
        .map(|(key, lessons)| (key, lessons.into_iter().cloned().collect()))
        .collect()
}
