//! Playlist entity model.

use serde::Serialize;
use sqlx::FromRow;

use jukebox_core::types::{DbId, Timestamp};

use crate::models::track::Track;

/// A row from the `playlists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Playlist {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A playlist together with its ordered track sequence.
///
/// This is the shape the API returns and the play orchestrator consumes;
/// `tracks` is always ordered by the tracks' stored position.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistWithTracks {
    pub id: DbId,
    pub name: String,
    pub tracks: Vec<Track>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PlaylistWithTracks {
    pub fn from_parts(playlist: Playlist, tracks: Vec<Track>) -> Self {
        Self {
            id: playlist.id,
            name: playlist.name,
            tracks,
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
        }
    }
}
