//! Broker configuration loaded from environment variables.

/// Connection and topology settings for the AMQP broker.
///
/// The exchange is a durable topic exchange; the queue is durable and bound
/// to it under `routing_key`. A dead-letter policy, if one is ever wanted to
/// bound redelivery of permanently failing messages, attaches to this queue.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// AMQP connection URL (default: `amqp://localhost:5672`).
    pub url: String,
    /// Topic exchange events are published to (default: `playlist_events`).
    pub exchange: String,
    /// Queue the consumer reads from (default: `track_played`).
    pub queue: String,
    /// Routing key for publish and binding (default: `track.played`).
    pub routing_key: String,
}

impl BrokerConfig {
    /// Load broker configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                  |
    /// |--------------------|--------------------------|
    /// | `AMQP_URL`         | `amqp://localhost:5672`  |
    /// | `AMQP_EXCHANGE`    | `playlist_events`        |
    /// | `AMQP_QUEUE`       | `track_played`           |
    /// | `AMQP_ROUTING_KEY` | `track.played`           |
    pub fn from_env() -> Self {
        let url = std::env::var("AMQP_URL").unwrap_or_else(|_| "amqp://localhost:5672".into());
        let exchange =
            std::env::var("AMQP_EXCHANGE").unwrap_or_else(|_| "playlist_events".into());
        let queue = std::env::var("AMQP_QUEUE").unwrap_or_else(|_| "track_played".into());
        let routing_key =
            std::env::var("AMQP_ROUTING_KEY").unwrap_or_else(|_| "track.played".into());

        Self {
            url,
            exchange,
            queue,
            routing_key,
        }
    }
}
