//! Debounced persistence flusher.
//!
//! Handlers mark a user dirty after every state-changing call; this task
//! batches those notifications and writes each dirty user's full state to
//! Postgres on a fixed interval. The core stays unaware of storage and
//! timing; this is the scheduler that decides when to flush.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use shiurim_db::models::rewards::RewardsWrite;
use shiurim_db::repositories::RewardsRepo;
use shiurim_db::DbPool;

use crate::sessions::SessionManager;

/// Cheap handle for marking a user's state dirty.
#[derive(Clone)]
pub struct SyncHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl SyncHandle {
    /// Queue `user_id` for the next flush.
    ///
    /// Infallible from the caller's perspective: if the flusher is gone
    /// (shutdown, tests without a flusher) the notification is dropped.
    pub fn mark_dirty(&self, user_id: &str) {
        let _ = self.tx.send(user_id.to_string());
    }

    /// A handle with no flusher behind it. Marks are dropped.
    pub fn detached() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self { tx }
    }
}

/// Spawn the background flusher.
///
/// Returns the handle for handlers plus the join handle; cancel the token
/// to trigger a final flush and shutdown.
pub fn spawn_flusher(
    pool: DbPool,
    sessions: Arc<SessionManager>,
    flush_interval: Duration,
    cancel: CancellationToken,
) -> (SyncHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let task = tokio::spawn(async move {
        let mut dirty: HashSet<String> = HashSet::new();
        let mut interval = tokio::time::interval(flush_interval);
        // The first tick fires immediately; skip it so writes debounce.
        interval.tick().await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    // Drain anything still queued, then flush once more.
                    while let Ok(user_id) = rx.try_recv() {
                        dirty.insert(user_id);
                    }
                    flush(&pool, &sessions, &mut dirty).await;
                    tracing::info!("Rewards flusher stopped");
                    return;
                }
                received = rx.recv() => {
                    match received {
                        Some(user_id) => { dirty.insert(user_id); }
                        None => {
                            flush(&pool, &sessions, &mut dirty).await;
                            return;
                        }
                    }
                }
                _ = interval.tick(), if !dirty.is_empty() => {
                    flush(&pool, &sessions, &mut dirty).await;
                }
            }
        }
    });

    (SyncHandle { tx }, task)
}

/// Write every dirty user's state. Users that fail stay dirty and are
/// retried on the next tick.
async fn flush(pool: &DbPool, sessions: &SessionManager, dirty: &mut HashSet<String>) {
    let user_ids: Vec<String> = dirty.iter().cloned().collect();
    for user_id in user_ids {
        let Some(state) = sessions.current_state(&user_id).await else {
            // Session evaporated (never loaded); nothing to persist.
            dirty.remove(&user_id);
            continue;
        };

        let write = match RewardsWrite::from_state(&state) {
            Ok(write) => write,
            Err(error) => {
                tracing::error!(%user_id, %error, "Rewards state not serializable; dropping");
                dirty.remove(&user_id);
                continue;
            }
        };

        match RewardsRepo::upsert(pool, &user_id, &write).await {
            Ok(()) => {
                dirty.remove(&user_id);
            }
            Err(error) => {
                tracing::warn!(%user_id, %error, "Rewards flush failed; will retry");
            }
        }
    }
}
