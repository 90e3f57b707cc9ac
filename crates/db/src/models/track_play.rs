//! Play-history entity model.

use serde::Serialize;
use sqlx::FromRow;

use jukebox_core::types::{DbId, Timestamp};

/// A row from the `track_plays` table. Written once, never mutated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrackPlay {
    pub id: DbId,
    pub playlist_id: DbId,
    pub track_id: DbId,
    pub position: i32,
    pub played_at: Timestamp,
    pub created_at: Timestamp,
}

/// Input for inserting a play-history row.
#[derive(Debug, Clone)]
pub struct NewTrackPlay {
    pub playlist_id: DbId,
    pub track_id: DbId,
    pub position: i32,
    pub played_at: Timestamp,
}
