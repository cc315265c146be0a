//! HTTP surface and composition root for the Shiurim backend.
//!
//! Wires the pure core (`shiurim-core`) to Postgres persistence
//! (`shiurim-db`) behind an axum router: catalog ingestion and grouped
//! views, per-user lesson completion and rewards queries, and a background
//! task that debounces snapshot writes.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod sessions;
pub mod state;
