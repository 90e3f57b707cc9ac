//! Persists decoded play events as play-history rows.

use async_trait::async_trait;

use jukebox_db::models::{NewTrackPlay, TrackPlay};
use jukebox_db::repositories::TrackPlayRepo;
use jukebox_db::DbPool;

use crate::consumer::TrackPlayHandler;
use crate::event::TrackPlayedEvent;

/// Error from recording a play.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to record track play: {0}")]
    Store(#[from] sqlx::Error),
}

/// Maps each [`TrackPlayedEvent`] 1:1 to a `track_plays` row.
///
/// There is no deduplication by `event_id`: redelivered events produce
/// duplicate rows (at-least-once delivery without dedup).
pub struct PlayRecorder {
    pool: DbPool,
}

impl PlayRecorder {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert the play-history row for one event.
    ///
    /// A store failure propagates back through the consumer's handler path
    /// and triggers reject-with-requeue.
    pub async fn record_track_play(
        &self,
        event: &TrackPlayedEvent,
    ) -> Result<TrackPlay, RecordError> {
        let play = NewTrackPlay {
            playlist_id: event.playlist_id,
            track_id: event.track_id,
            position: event.position,
            played_at: event.played_at,
        };

        let row = TrackPlayRepo::insert(&self.pool, &play).await?;

        tracing::info!(
            playlist_id = row.playlist_id,
            track_id = row.track_id,
            position = row.position,
            "recorded track play"
        );

        Ok(row)
    }
}

#[async_trait]
impl TrackPlayHandler for PlayRecorder {
    async fn handle(&self, event: TrackPlayedEvent) -> anyhow::Result<()> {
        self.record_track_play(&event).await?;
        Ok(())
    }
}
