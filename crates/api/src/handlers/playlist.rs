//! Handlers for the `/playlists` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use jukebox_core::error::CoreError;
use jukebox_core::playlist::NewPlaylist;
use jukebox_core::types::DbId;
use jukebox_db::models::{PlaylistWithTracks, TrackPlay};
use jukebox_db::repositories::{PlaylistRepo, TrackPlayRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response body for a play request.
#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub playlist_id: DbId,
    pub tracks_queued: usize,
    pub message: &'static str,
}

/// POST /playlists
///
/// Validate and persist a playlist with its ordered tracks.
pub async fn create_playlist(
    State(state): State<AppState>,
    Json(input): Json<NewPlaylist>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let created = PlaylistRepo::create(&state.pool, &input).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /playlists
///
/// List every playlist with its tracks.
pub async fn list_playlists(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PlaylistWithTracks>>> {
    let playlists = PlaylistRepo::list_all(&state.pool).await?;
    Ok(Json(playlists))
}

/// GET /playlists/{id}
pub async fn get_playlist(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PlaylistWithTracks>> {
    let playlist = find_playlist(&state, id).await?;
    Ok(Json(playlist))
}

/// POST /playlists/{id}/play
///
/// Emit one track-played event per track of the playlist. Partial emission
/// is possible on failure; the response reflects only the success path.
pub async fn play_playlist(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PlayResponse>> {
    let receipt = state.orchestrator.play_playlist(id).await?;

    Ok(Json(PlayResponse {
        playlist_id: receipt.playlist_id,
        tracks_queued: receipt.tracks_queued,
        message: "Playlist is being played",
    }))
}

/// GET /playlists/{id}/plays
///
/// Play history of a playlist, most recent first.
pub async fn list_playlist_plays(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<TrackPlay>>> {
    // 404 for unknown playlists rather than an empty history.
    find_playlist(&state, id).await?;

    let plays = TrackPlayRepo::list_by_playlist(&state.pool, id).await?;
    Ok(Json(plays))
}

/// Fetch a playlist or fail with the appropriate domain error.
async fn find_playlist(state: &AppState, id: DbId) -> Result<PlaylistWithTracks, AppError> {
    if id <= 0 {
        return Err(AppError::Core(CoreError::validation("invalid playlist id")));
    }

    PlaylistRepo::find_with_tracks(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Playlist",
            id,
        }))
}
