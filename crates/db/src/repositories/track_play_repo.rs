//! Repository for the `track_plays` table.

use sqlx::PgPool;

use jukebox_core::types::DbId;

use crate::models::track_play::{NewTrackPlay, TrackPlay};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, playlist_id, track_id, position, played_at, created_at";

/// Provides persistence for play-history records.
pub struct TrackPlayRepo;

impl TrackPlayRepo {
    /// Insert a play-history row, returning the created record.
    ///
    /// No uniqueness is enforced: inserting the same play twice produces
    /// two rows (at-least-once delivery without dedup).
    pub async fn insert(pool: &PgPool, input: &NewTrackPlay) -> Result<TrackPlay, sqlx::Error> {
        let query = format!(
            "INSERT INTO track_plays (playlist_id, track_id, position, played_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TrackPlay>(&query)
            .bind(input.playlist_id)
            .bind(input.track_id)
            .bind(input.position)
            .bind(input.played_at)
            .fetch_one(pool)
            .await
    }

    /// List plays for a playlist, most recent first.
    pub async fn list_by_playlist(
        pool: &PgPool,
        playlist_id: DbId,
    ) -> Result<Vec<TrackPlay>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM track_plays WHERE playlist_id = $1 ORDER BY played_at DESC, id DESC"
        );
        sqlx::query_as::<_, TrackPlay>(&query)
            .bind(playlist_id)
            .fetch_all(pool)
            .await
    }

    /// List plays for a single track, most recent first.
    pub async fn list_by_track(
        pool: &PgPool,
        track_id: DbId,
    ) -> Result<Vec<TrackPlay>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM track_plays WHERE track_id = $1 ORDER BY played_at DESC, id DESC"
        );
        sqlx::query_as::<_, TrackPlay>(&query)
            .bind(track_id)
            .fetch_all(pool)
            .await
    }
}
