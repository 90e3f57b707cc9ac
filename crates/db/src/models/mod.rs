pub mod playlist;
pub mod track;
pub mod track_play;

pub use playlist::{Playlist, PlaylistWithTracks};
pub use track::Track;
pub use track_play::{NewTrackPlay, TrackPlay};
