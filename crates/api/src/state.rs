use std::sync::Arc;

use tokio::sync::RwLock;

use shiurim_core::catalog::CatalogIndex;

use crate::background::sync::SyncHandle;
use crate::config::ServerConfig;
use crate::sessions::SessionManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: shiurim_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The one in-process catalog index; replaced wholesale on ingestion.
    pub catalog: Arc<RwLock<CatalogIndex>>,
    /// Per-user rewards engine sessions.
    pub sessions: Arc<SessionManager>,
    /// Dirty-user notifications for the background persistence flusher.
    pub sync: SyncHandle,
}
