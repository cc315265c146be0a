//! Per-user rewards engine sessions.
//!
//! The engine itself is not safe for concurrent writers, so each user's
//! engine lives behind its own `Mutex`: at most one completion call is in
//! flight per user, while different users proceed in parallel. State is
//! loaded from Postgres on first touch and kept in memory afterwards; the
//! background flusher writes it back.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use shiurim_core::rewards::{RewardsEngine, RewardsState};
use shiurim_db::repositories::RewardsRepo;
use shiurim_db::DbPool;

use crate::error::{AppError, AppResult};

/// Registry of live per-user engines.
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Mutex<RewardsEngine>>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the engine for `user_id`, loading persisted state on first touch.
    ///
    /// A user with no stored row starts from a fresh state.
    pub async fn get_or_load(
        &self,
        pool: &DbPool,
        user_id: &str,
    ) -> AppResult<Arc<Mutex<RewardsEngine>>> {
        if let Some(engine) = self.sessions.read().await.get(user_id) {
            return Ok(Arc::clone(engine));
        }

        let state = match RewardsRepo::find_by_user(pool, user_id).await? {
            Some(row) => row.into_state().map_err(|e| {
                AppError::Internal(format!("Corrupt stored rewards state for {user_id}: {e}"))
            })?,
            None => RewardsState::default(),
        };

        // Two callers may race the load; the first inserted engine wins so
        // both end up sharing one session.
        let mut sessions = self.sessions.write().await;
        let engine = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(RewardsEngine::from_state(state))));
        Ok(Arc::clone(engine))
    }

    /// Insert a ready-made engine, replacing any existing session.
    pub async fn insert(&self, user_id: &str, engine: RewardsEngine) {
        self.sessions
            .write()
            .await
            .insert(user_id.to_string(), Arc::new(Mutex::new(engine)));
    }

    /// Clone the current state of a live session, if one exists.
    ///
    /// Used by the background flusher; a user who was never touched has
    /// nothing to persist.
    pub async fn current_state(&self, user_id: &str) -> Option<RewardsState> {
        let engine = {
            let sessions = self.sessions.read().await;
            sessions.get(user_id).cloned()
        }?;
        let engine = engine.lock().await;
        Some(engine.state().clone())
    }
}
