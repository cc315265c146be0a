//! Handlers for per-user progress and rewards.
//!
//! Each user's engine lives in a session (see [`crate::sessions`]); every
//! state-changing handler marks the user dirty so the background flusher
//! persists the new state.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};

use shiurim_core::levels::Level;
use shiurim_core::rewards::{CompletionOutcome, RewardsSnapshot, RewardsState};

use crate::error::AppResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Full per-user rewards view for the UI: raw state plus the derived level
/// figures the progress bars need.
#[derive(Debug, Serialize)]
pub struct RewardsView {
    #[serde(flatten)]
    pub state: RewardsState,
    pub level: &'static Level,
    pub level_progress: u8,
    pub completed_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CompleteLessonResponse {
    pub outcome: CompletionOutcome,
    pub rewards: RewardsView,
}

#[derive(Debug, Deserialize)]
pub struct WatchProgressBody {
    pub percent: u8,
}

#[derive(Debug, Deserialize)]
pub struct ModuleProgressParams {
    /// Comma-separated lesson ids.
    pub lesson_ids: String,
}

#[derive(Debug, Serialize)]
pub struct ModuleProgressResponse {
    pub progress: u8,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Whether the remote state was adopted wholesale.
    pub adopted: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users/{user_id}/rewards
pub async fn get_rewards(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<RewardsView>> {
    let session = state.sessions.get_or_load(&state.pool, &user_id).await?;
    let engine = session.lock().await;
    Ok(Json(RewardsView {
        state: engine.state().clone(),
        level: engine.level(),
        level_progress: engine.level_progress(),
        completed_count: engine.completed_count(),
    }))
}

/// POST /api/v1/users/{user_id}/lessons/{lesson_id}/complete
///
/// Runs the full completion transition at the server's local wall-clock
/// time and reports what changed alongside the updated view.
pub async fn complete_lesson(
    State(state): State<AppState>,
    Path((user_id, lesson_id)): Path<(String, String)>,
) -> AppResult<Json<CompleteLessonResponse>> {
    let session = state.sessions.get_or_load(&state.pool, &user_id).await?;
    let mut engine = session.lock().await;

    let outcome = engine.complete_lesson(&lesson_id, Local::now().naive_local());
    if !outcome.already_completed {
        state.sync.mark_dirty(&user_id);
        tracing::info!(
            %user_id,
            %lesson_id,
            xp = outcome.xp_gained,
            streak = outcome.current_streak,
            "Lesson completed"
        );
    }

    let rewards = RewardsView {
        state: engine.state().clone(),
        level: engine.level(),
        level_progress: engine.level_progress(),
        completed_count: engine.completed_count(),
    };
    Ok(Json(CompleteLessonResponse { outcome, rewards }))
}

/// POST /api/v1/users/{user_id}/lessons/{lesson_id}/watch
pub async fn update_watch_progress(
    State(state): State<AppState>,
    Path((user_id, lesson_id)): Path<(String, String)>,
    Json(body): Json<WatchProgressBody>,
) -> AppResult<Json<RewardsView>> {
    let session = state.sessions.get_or_load(&state.pool, &user_id).await?;
    let mut engine = session.lock().await;

    engine.update_watch_progress(&lesson_id, body.percent);
    state.sync.mark_dirty(&user_id);

    Ok(Json(RewardsView {
        state: engine.state().clone(),
        level: engine.level(),
        level_progress: engine.level_progress(),
        completed_count: engine.completed_count(),
    }))
}

/// POST /api/v1/users/{user_id}/rewards/dismiss-level-up
pub async fn dismiss_level_up(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<()> {
    let session = state.sessions.get_or_load(&state.pool, &user_id).await?;
    session.lock().await.dismiss_level_up();
    state.sync.mark_dirty(&user_id);
    Ok(())
}

/// POST /api/v1/users/{user_id}/rewards/dismiss-new-badge
pub async fn dismiss_new_badge(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<()> {
    let session = state.sessions.get_or_load(&state.pool, &user_id).await?;
    session.lock().await.dismiss_new_badge();
    state.sync.mark_dirty(&user_id);
    Ok(())
}

/// GET /api/v1/users/{user_id}/module-progress?lesson_ids=a,b,c
pub async fn module_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ModuleProgressParams>,
) -> AppResult<Json<ModuleProgressResponse>> {
    let lesson_ids: Vec<String> = params
        .lesson_ids
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    let session = state.sessions.get_or_load(&state.pool, &user_id).await?;
    let engine = session.lock().await;
    Ok(Json(ModuleProgressResponse {
        progress: engine.module_progress(&lesson_ids),
    }))
}

/// GET /api/v1/users/{user_id}/rewards/snapshot
///
/// Compact summary for external sync collaborators.
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<RewardsSnapshot>> {
    let session = state.sessions.get_or_load(&state.pool, &user_id).await?;
    let engine = session.lock().await;
    Ok(Json(engine.snapshot()))
}

/// POST /api/v1/users/{user_id}/rewards/import
///
/// Reconcile remote state: adopt it wholesale only if the remote
/// experience exceeds the local one (all fields together, never
/// field-by-field). The core just accepts the overwrite.
pub async fn import_state(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(remote): Json<RewardsState>,
) -> AppResult<Json<ImportResponse>> {
    let session = state.sessions.get_or_load(&state.pool, &user_id).await?;
    let mut engine = session.lock().await;

    let adopted = remote.experience > engine.state().experience;
    if adopted {
        tracing::info!(
            %user_id,
            local_xp = engine.state().experience,
            remote_xp = remote.experience,
            "Adopting remote rewards state"
        );
        engine.replace_state(remote);
        state.sync.mark_dirty(&user_id);
    }

    Ok(Json(ImportResponse { adopted }))
}
