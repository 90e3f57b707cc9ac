//! Play orchestration: load a playlist, emit one event per track.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use jukebox_core::error::CoreError;
use jukebox_core::types::DbId;
use jukebox_db::models::PlaylistWithTracks;
use jukebox_db::repositories::PlaylistRepo;
use jukebox_db::DbPool;
use serde::Serialize;

use crate::error::MessagingError;
use crate::event::TrackPlayedEvent;
use crate::publisher::EventPublisher;

/// Loads playlists for the orchestrator. Abstracted so play logic can be
/// tested without a database.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Load a playlist with its ordered tracks.
    async fn playlist_with_tracks(&self, id: DbId) -> Result<PlaylistWithTracks, CoreError>;
}

/// Primary [`PlaylistSource`] backed by the relational store.
pub struct PgPlaylistSource {
    pool: DbPool,
}

impl PgPlaylistSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistSource for PgPlaylistSource {
    async fn playlist_with_tracks(&self, id: DbId) -> Result<PlaylistWithTracks, CoreError> {
        if id <= 0 {
            return Err(CoreError::validation("invalid playlist id"));
        }

        match PlaylistRepo::find_with_tracks(&self.pool, id).await {
            Ok(Some(playlist)) => Ok(playlist),
            Ok(None) => Err(CoreError::NotFound {
                entity: "Playlist",
                id,
            }),
            Err(e) => {
                tracing::error!(error = %e, playlist_id = id, "playlist lookup failed");
                Err(CoreError::Internal(format!("failed to load playlist {id}")))
            }
        }
    }
}

/// Errors from a play invocation.
///
/// Publish failures carry the failing track so the caller can see where the
/// emission stopped; transport detail stays in the source chain.
#[derive(Debug, thiserror::Error)]
pub enum PlayError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to publish event for track {track_id}")]
    Publish {
        track_id: DbId,
        #[source]
        source: MessagingError,
    },
}

/// Outcome of a successful play invocation.
#[derive(Debug, Clone, Serialize)]
pub struct PlayReceipt {
    pub playlist_id: DbId,
    pub tracks_queued: usize,
}

/// Emits one [`TrackPlayedEvent`] per track of a playlist, in position order.
pub struct PlayOrchestrator {
    source: Arc<dyn PlaylistSource>,
    publisher: Arc<dyn EventPublisher>,
}

impl PlayOrchestrator {
    pub fn new(source: Arc<dyn PlaylistSource>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { source, publisher }
    }

    /// Play a playlist: publish one event per track, positions ascending
    /// from 0, all stamped with a single shared `played_at`.
    ///
    /// An empty playlist is a successful no-op. The first publish failure
    /// aborts the remaining tracks; events already published are not
    /// retracted, so partial emission is a possible outcome the caller must
    /// tolerate.
    pub async fn play_playlist(&self, playlist_id: DbId) -> Result<PlayReceipt, PlayError> {
        let playlist = self.source.playlist_with_tracks(playlist_id).await?;

        if playlist.tracks.is_empty() {
            tracing::info!(playlist_id, "playlist is empty, nothing to play");
            return Ok(PlayReceipt {
                playlist_id,
                tracks_queued: 0,
            });
        }

        tracing::info!(
            playlist_id,
            track_count = playlist.tracks.len(),
            "playing playlist"
        );

        // Sampled once: every event of this invocation shares one played_at.
        let played_at = Utc::now();

        for (position, track) in playlist.tracks.iter().enumerate() {
            let event = TrackPlayedEvent::for_track(track, position as i32, played_at);

            self.publisher
                .publish(&event)
                .await
                .map_err(|source| PlayError::Publish {
                    track_id: track.id,
                    source,
                })?;
        }

        tracing::info!(
            playlist_id,
            track_count = playlist.tracks.len(),
            "published all track events"
        );

        Ok(PlayReceipt {
            playlist_id,
            tracks_queued: playlist.tracks.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use jukebox_db::models::{Playlist, PlaylistWithTracks, Track};

    fn playlist_with_tracks(id: DbId, titles: &[(&str, &str)]) -> PlaylistWithTracks {
        let now = Utc::now();
        let playlist = Playlist {
            id,
            name: "Road Trip".to_string(),
            created_at: now,
            updated_at: now,
        };
        let tracks = titles
            .iter()
            .enumerate()
            .map(|(i, (title, artist))| Track {
                id: (i + 1) as DbId * 10,
                playlist_id: id,
                title: title.to_string(),
                artist: artist.to_string(),
                position: i as i32,
                created_at: now,
                updated_at: now,
            })
            .collect();
        PlaylistWithTracks::from_parts(playlist, tracks)
    }

    struct FixedSource {
        playlist: Option<PlaylistWithTracks>,
    }

    #[async_trait]
    impl PlaylistSource for FixedSource {
        async fn playlist_with_tracks(&self, id: DbId) -> Result<PlaylistWithTracks, CoreError> {
            self.playlist
                .clone()
                .ok_or(CoreError::NotFound {
                    entity: "Playlist",
                    id,
                })
        }
    }

    /// Publisher double capturing events, optionally failing at a fixed index.
    struct CapturingPublisher {
        published: Mutex<Vec<TrackPlayedEvent>>,
        fail_at: Option<usize>,
    }

    impl CapturingPublisher {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                published: Mutex::new(Vec::new()),
                fail_at,
            }
        }

        fn published(&self) -> Vec<TrackPlayedEvent> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventPublisher for CapturingPublisher {
        async fn publish(&self, event: &TrackPlayedEvent) -> Result<(), MessagingError> {
            let mut published = self.published.lock().unwrap();
            if self.fail_at == Some(published.len()) {
                return Err(MessagingError::Serialization(
                    <serde_json::Error as serde::ser::Error>::custom("broker unavailable"),
                ));
            }
            published.push(event.clone());
            Ok(())
        }

        async fn close(&self) -> Result<(), MessagingError> {
            Ok(())
        }
    }

    fn orchestrator(
        playlist: Option<PlaylistWithTracks>,
        fail_at: Option<usize>,
    ) -> (Arc<CapturingPublisher>, PlayOrchestrator) {
        let publisher = Arc::new(CapturingPublisher::new(fail_at));
        let orchestrator = PlayOrchestrator::new(
            Arc::new(FixedSource { playlist }),
            Arc::clone(&publisher) as Arc<dyn EventPublisher>,
        );
        (publisher, orchestrator)
    }

    #[tokio::test]
    async fn publishes_one_event_per_track_in_position_order() {
        let playlist = playlist_with_tracks(7, &[("Song A", "Artist X"), ("Song B", "Artist Y")]);
        let (publisher, orchestrator) = orchestrator(Some(playlist), None);

        let receipt = orchestrator.play_playlist(7).await.unwrap();
        assert_eq!(receipt.playlist_id, 7);
        assert_eq!(receipt.tracks_queued, 2);

        let events = publisher.published();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].position, 0);
        assert_eq!(events[0].track_title, "Song A");
        assert_eq!(events[1].position, 1);
        assert_eq!(events[1].artist, "Artist Y");
        assert!(events.iter().all(|e| e.playlist_id == 7));
    }

    #[tokio::test]
    async fn all_events_of_one_invocation_share_a_played_at() {
        let playlist = playlist_with_tracks(
            3,
            &[("Song A", "Artist X"), ("Song B", "Artist Y"), ("Song C", "Artist Z")],
        );
        let (publisher, orchestrator) = orchestrator(Some(playlist), None);

        orchestrator.play_playlist(3).await.unwrap();

        let events = publisher.published();
        assert!(events.iter().all(|e| e.played_at == events[0].played_at));
        // Event ids stay unique even though the timestamp is shared.
        assert_ne!(events[0].event_id, events[1].event_id);
        assert_ne!(events[1].event_id, events[2].event_id);
    }

    #[tokio::test]
    async fn empty_playlist_is_a_successful_no_op() {
        let playlist = playlist_with_tracks(5, &[]);
        let (publisher, orchestrator) = orchestrator(Some(playlist), None);

        let receipt = orchestrator.play_playlist(5).await.unwrap();
        assert_eq!(receipt.tracks_queued, 0);
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_aborts_remaining_tracks() {
        let playlist = playlist_with_tracks(
            9,
            &[("Song A", "Artist X"), ("Song B", "Artist Y"), ("Song C", "Artist Z")],
        );
        let (publisher, orchestrator) = orchestrator(Some(playlist), Some(1));

        let err = orchestrator.play_playlist(9).await.unwrap_err();

        // Track ids are 10, 20, 30; the failure hit the second track.
        match err {
            PlayError::Publish { track_id, .. } => assert_eq!(track_id, 20),
            other => panic!("expected publish error, got {other:?}"),
        }

        // The first event went out and is not retracted; nothing after the
        // failure was attempted.
        let events = publisher.published();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].position, 0);
    }

    #[tokio::test]
    async fn unknown_playlist_is_not_found() {
        let (publisher, orchestrator) = orchestrator(None, None);

        let err = orchestrator.play_playlist(404).await.unwrap_err();
        assert!(matches!(
            err,
            PlayError::Core(CoreError::NotFound { id: 404, .. })
        ));
        assert!(publisher.published().is_empty());
    }
}
