//! The wire event emitted for every track of a played playlist.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use jukebox_core::types::{DbId, Timestamp};
use jukebox_db::models::Track;

/// Published to the broker when a track is played as part of a playlist.
///
/// Transient: exists only on the wire, is never persisted as-is, and is
/// immutable once constructed. The field names are the JSON contract with
/// any downstream consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPlayedEvent {
    pub playlist_id: DbId,
    pub track_id: DbId,
    pub track_title: String,
    pub artist: String,
    /// Zero-based position of the track within the playlist at play time.
    pub position: i32,
    /// When the play was initiated. All events of one play invocation
    /// carry the same value.
    pub played_at: Timestamp,
    /// Globally unique event id, for tracing and downstream idempotency.
    pub event_id: Uuid,
}

impl TrackPlayedEvent {
    /// Build the event for one track of a play invocation, with a freshly
    /// generated `event_id`.
    pub fn for_track(track: &Track, position: i32, played_at: Timestamp) -> Self {
        Self {
            playlist_id: track.playlist_id,
            track_id: track.id,
            track_title: track.title.clone(),
            artist: track.artist.clone(),
            position,
            played_at,
            event_id: Uuid::new_v4(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_carries_the_exact_field_set() {
        let event = TrackPlayedEvent {
            playlist_id: 7,
            track_id: 42,
            track_title: "Song A".to_string(),
            artist: "Artist X".to_string(),
            position: 0,
            played_at: "2024-05-01T12:00:00Z".parse().unwrap(),
            event_id: Uuid::nil(),
        };

        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "artist",
                "event_id",
                "played_at",
                "playlist_id",
                "position",
                "track_id",
                "track_title",
            ]
        );
        assert_eq!(object["playlist_id"], 7);
        assert_eq!(object["position"], 0);
        // Timestamps go out as RFC 3339 strings, ids as UUID strings.
        assert_eq!(object["played_at"], "2024-05-01T12:00:00Z");
        assert_eq!(object["event_id"], "00000000-0000-0000-0000-000000000000");
    }
}
