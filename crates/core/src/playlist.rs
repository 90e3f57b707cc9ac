//! Playlist input types and validation rules.
//!
//! [`NewPlaylist`] is the deserialized shape of a create request. Validation
//! happens here, before anything touches the database, so the repository
//! layer only ever sees well-formed input.

use serde::Deserialize;

use crate::error::CoreError;

/// Maximum length of a playlist name, in characters.
pub const MAX_PLAYLIST_NAME_LEN: usize = 255;

/// Maximum length of a track title, in characters.
pub const MAX_TRACK_TITLE_LEN: usize = 255;

/// Maximum length of an artist name, in characters.
pub const MAX_ARTIST_NAME_LEN: usize = 255;

/// Maximum number of tracks a single playlist may hold.
pub const MAX_TRACKS_PER_PLAYLIST: usize = 100;

/// Input for creating a playlist, with its ordered tracks.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlaylist {
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<NewTrack>,
}

/// A single track within a [`NewPlaylist`]. Position is implied by index.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
}

impl NewPlaylist {
    /// Validate the playlist and all of its tracks.
    ///
    /// Rules: name non-empty after trimming and at most
    /// [`MAX_PLAYLIST_NAME_LEN`] characters; at most
    /// [`MAX_TRACKS_PER_PLAYLIST`] tracks; every track title and artist
    /// non-empty after trimming and within their length bounds.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("playlist name cannot be empty"));
        }
        if self.name.chars().count() > MAX_PLAYLIST_NAME_LEN {
            return Err(CoreError::validation(format!(
                "playlist name too long (max {MAX_PLAYLIST_NAME_LEN} characters)"
            )));
        }
        if self.tracks.len() > MAX_TRACKS_PER_PLAYLIST {
            return Err(CoreError::validation(format!(
                "playlist cannot have more than {MAX_TRACKS_PER_PLAYLIST} tracks"
            )));
        }
        for (index, track) in self.tracks.iter().enumerate() {
            track
                .validate()
                .map_err(|e| CoreError::validation(format!("track {} invalid: {e}", index + 1)))?;
        }
        Ok(())
    }
}

impl NewTrack {
    fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("track title cannot be empty"));
        }
        if self.artist.trim().is_empty() {
            return Err(CoreError::validation("track artist cannot be empty"));
        }
        if self.title.chars().count() > MAX_TRACK_TITLE_LEN {
            return Err(CoreError::validation(format!(
                "track title too long (max {MAX_TRACK_TITLE_LEN} characters)"
            )));
        }
        if self.artist.chars().count() > MAX_ARTIST_NAME_LEN {
            return Err(CoreError::validation(format!(
                "artist name too long (max {MAX_ARTIST_NAME_LEN} characters)"
            )));
        }
        Ok(())
    }
}
