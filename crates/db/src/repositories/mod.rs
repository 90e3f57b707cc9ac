pub mod playlist_repo;
pub mod track_play_repo;

pub use playlist_repo::PlaylistRepo;
pub use track_play_repo::TrackPlayRepo;
