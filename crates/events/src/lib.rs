//! Asynchronous play/record pipeline.
//!
//! This crate owns everything between a "play" request and a durable
//! play-history row:
//!
//! - [`TrackPlayedEvent`] — the wire payload, one per track per play.
//! - [`EventPublisher`] / [`AmqpEventPublisher`] — durable publish to a
//!   topic exchange.
//! - [`EventConsumer`] / [`AmqpEventConsumer`] — manual-ack subscription
//!   and the decode-and-dispatch delivery loop.
//! - [`ConsumerSupervisor`] — lifecycle (start/stop) for the consumer with
//!   cancellation-safe state transitions.
//! - [`PlayOrchestrator`] — loads a playlist and emits its events in order.
//! - [`PlayRecorder`] — turns a decoded event into a `track_plays` row.

pub mod config;
pub mod consumer;
pub mod error;
pub mod event;
pub mod play;
pub mod publisher;
pub mod recorder;
pub mod supervisor;

pub use config::BrokerConfig;
pub use consumer::{AmqpEventConsumer, EventConsumer, TrackPlayHandler};
pub use error::MessagingError;
pub use event::TrackPlayedEvent;
pub use play::{PgPlaylistSource, PlayError, PlayOrchestrator, PlayReceipt, PlaylistSource};
pub use publisher::{AmqpEventPublisher, EventPublisher};
pub use recorder::{PlayRecorder, RecordError};
pub use supervisor::{ConsumerSupervisor, SupervisorError};
