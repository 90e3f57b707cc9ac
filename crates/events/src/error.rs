//! Transport-level error type for the broker layer.
//!
//! These errors stay outside the HTTP-facing taxonomy in `jukebox-core`:
//! the orchestrator wraps them, the consumer turns them into requeues.

/// Errors raised by the AMQP publisher and consumer.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("broker connection failed: {0}")]
    Connection(#[source] lapin::Error),

    #[error("broker topology setup failed: {0}")]
    Topology(#[source] lapin::Error),

    #[error("event publish failed: {0}")]
    Publish(#[source] lapin::Error),

    #[error("consumer registration failed: {0}")]
    Consume(#[source] lapin::Error),

    #[error("event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
