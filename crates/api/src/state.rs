use std::sync::Arc;

use jukebox_events::PlayOrchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: jukebox_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Play orchestrator (owns the event publisher seam).
    pub orchestrator: Arc<PlayOrchestrator>,
}
