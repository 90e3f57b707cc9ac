//! Route tree construction.
//!
//! ```text
//! /health                  service + database health
//!
//! /playlists               create (POST), list (GET)
//! /playlists/{id}          fetch (GET)
//! /playlists/{id}/play     emit play events (POST)
//! /playlists/{id}/plays    play history (GET)
//! ```

pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::playlist;
use crate::state::AppState;

/// Build the playlist route tree. Auth, when enabled, is layered on top of
/// exactly these routes (health stays public).
pub fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/playlists",
            post(playlist::create_playlist).get(playlist::list_playlists),
        )
        .route("/playlists/{id}", get(playlist::get_playlist))
        .route("/playlists/{id}/play", post(playlist::play_playlist))
        .route("/playlists/{id}/plays", get(playlist::list_playlist_plays))
}
