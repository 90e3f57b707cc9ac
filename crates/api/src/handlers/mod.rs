//! Request handlers.
//!
//! Handlers validate input via `jukebox-core`, delegate persistence to the
//! repositories in `jukebox-db`, and map errors via [`AppError`](crate::error::AppError).

pub mod playlist;
