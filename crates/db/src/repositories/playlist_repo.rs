//! Repository for the `playlists` and `tracks` tables.

use std::collections::HashMap;

use sqlx::PgPool;

use jukebox_core::playlist::NewPlaylist;
use jukebox_core::types::DbId;

use crate::models::playlist::{Playlist, PlaylistWithTracks};
use crate::models::track::Track;

/// Column list shared across queries to avoid repetition.
const PLAYLIST_COLUMNS: &str = "id, name, created_at, updated_at";
const TRACK_COLUMNS: &str = "id, playlist_id, title, artist, position, created_at, updated_at";

/// Provides persistence for playlists and their track sequences.
pub struct PlaylistRepo;

impl PlaylistRepo {
    /// Insert a playlist and its tracks in one transaction, returning the
    /// created rows. Track positions are assigned from input order.
    pub async fn create(
        pool: &PgPool,
        input: &NewPlaylist,
    ) -> Result<PlaylistWithTracks, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("INSERT INTO playlists (name) VALUES ($1) RETURNING {PLAYLIST_COLUMNS}");
        let playlist = sqlx::query_as::<_, Playlist>(&query)
            .bind(&input.name)
            .fetch_one(&mut *tx)
            .await?;

        let mut tracks = Vec::with_capacity(input.tracks.len());
        let track_query = format!(
            "INSERT INTO tracks (playlist_id, title, artist, position) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {TRACK_COLUMNS}"
        );
        for (position, track) in input.tracks.iter().enumerate() {
            let row = sqlx::query_as::<_, Track>(&track_query)
                .bind(playlist.id)
                .bind(&track.title)
                .bind(&track.artist)
                .bind(position as i32)
                .fetch_one(&mut *tx)
                .await?;
            tracks.push(row);
        }

        tx.commit().await?;

        Ok(PlaylistWithTracks::from_parts(playlist, tracks))
    }

    /// Fetch a playlist with its tracks in position order.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn find_with_tracks(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PlaylistWithTracks>, sqlx::Error> {
        let query = format!("SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE id = $1");
        let Some(playlist) = sqlx::query_as::<_, Playlist>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let track_query =
            format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE playlist_id = $1 ORDER BY position");
        let tracks = sqlx::query_as::<_, Track>(&track_query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        Ok(Some(PlaylistWithTracks::from_parts(playlist, tracks)))
    }

    /// List every playlist with its tracks, newest playlist first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<PlaylistWithTracks>, sqlx::Error> {
        let query = format!("SELECT {PLAYLIST_COLUMNS} FROM playlists ORDER BY id DESC");
        let playlists = sqlx::query_as::<_, Playlist>(&query).fetch_all(pool).await?;

        let track_query =
            format!("SELECT {TRACK_COLUMNS} FROM tracks ORDER BY playlist_id, position");
        let tracks = sqlx::query_as::<_, Track>(&track_query)
            .fetch_all(pool)
            .await?;

        let mut by_playlist: HashMap<DbId, Vec<Track>> = HashMap::new();
        for track in tracks {
            by_playlist.entry(track.playlist_id).or_default().push(track);
        }

        let result = playlists
            .into_iter()
            .map(|playlist| {
                let tracks = by_playlist.remove(&playlist.id).unwrap_or_default();
                PlaylistWithTracks::from_parts(playlist, tracks)
            })
            .collect();

        Ok(result)
    }
}
