//! Durable, at-least-once event publishing to the broker.

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ExchangeDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};

use crate::config::BrokerConfig;
use crate::error::MessagingError;
use crate::event::TrackPlayedEvent;

/// AMQP delivery mode 2: the broker writes the message to disk.
const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// AMQP reply code for a clean connection close.
const CLOSE_OK: u16 = 200;

/// Publishes [`TrackPlayedEvent`]s to a topic exchange.
///
/// The publisher performs no retries; the caller decides whether a failed
/// publish aborts or is retried.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &TrackPlayedEvent) -> Result<(), MessagingError>;

    /// Release the broker connection. Safe to call more than once.
    async fn close(&self) -> Result<(), MessagingError>;
}

/// Primary [`EventPublisher`] backed by a dedicated AMQP connection.
///
/// The connection and channel are owned exclusively by this instance and
/// never shared with a consumer.
pub struct AmqpEventPublisher {
    connection: Connection,
    channel: Channel,
    config: BrokerConfig,
}

impl AmqpEventPublisher {
    /// Connect to the broker and declare the durable topic exchange.
    pub async fn connect(config: BrokerConfig) -> Result<Self, MessagingError> {
        let connection = Connection::connect(
            &config.url,
            ConnectionProperties::default().with_connection_name("jukebox-publisher".into()),
        )
        .await
        .map_err(MessagingError::Connection)?;

        let channel = connection
            .create_channel()
            .await
            .map_err(MessagingError::Connection)?;

        channel
            .exchange_declare(
                &config.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(MessagingError::Topology)?;

        tracing::info!(exchange = %config.exchange, "event publisher connected");

        Ok(Self {
            connection,
            channel,
            config,
        })
    }
}

#[async_trait]
impl EventPublisher for AmqpEventPublisher {
    async fn publish(&self, event: &TrackPlayedEvent) -> Result<(), MessagingError> {
        let body = serde_json::to_vec(event)?;

        let confirm = self
            .channel
            .basic_publish(
                &self.config.exchange,
                &self.config.routing_key,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    .with_delivery_mode(DELIVERY_MODE_PERSISTENT),
            )
            .await
            .map_err(MessagingError::Publish)?;

        confirm.await.map_err(MessagingError::Publish)?;

        tracing::debug!(
            playlist_id = event.playlist_id,
            track_id = event.track_id,
            position = event.position,
            "published track played event"
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), MessagingError> {
        if self.connection.status().connected() {
            self.connection
                .close(CLOSE_OK, "shutting down")
                .await
                .map_err(MessagingError::Connection)?;
        }
        Ok(())
    }
}
