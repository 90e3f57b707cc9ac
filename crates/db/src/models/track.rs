//! Track entity model.

use serde::Serialize;
use sqlx::FromRow;

use jukebox_core::types::{DbId, Timestamp};

/// A row from the `tracks` table. Belongs to exactly one playlist.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Track {
    pub id: DbId,
    pub playlist_id: DbId,
    pub title: String,
    pub artist: String,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
