//! Manual-acknowledgment event consumption.
//!
//! The consumer subscribes to the queue bound to the publisher's exchange
//! and, per delivery, decodes the payload and invokes the registered
//! handler. Acknowledgment follows the outcome:
//!
//! - decode failure → reject without requeue (retry can never succeed),
//! - handler failure → reject with requeue (redelivered for retry),
//! - handler success → acknowledge.
//!
//! There is no redelivery cap: a handler that fails permanently keeps the
//! message cycling. Bounding that requires a dead-letter policy on the
//! queue (see [`BrokerConfig`]).

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, ExchangeDeclareOptions,
    QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, ExchangeKind};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::BrokerConfig;
use crate::error::MessagingError;
use crate::event::TrackPlayedEvent;

/// AMQP reply code for a clean connection close.
const CLOSE_OK: u16 = 200;

/// Processes one decoded event. The play-history recorder is the primary
/// implementation.
#[async_trait]
pub trait TrackPlayHandler: Send + Sync {
    async fn handle(&self, event: TrackPlayedEvent) -> anyhow::Result<()>;
}

/// Subscribes to the broker and feeds decoded events to a handler.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    /// Register the subscription and spawn the delivery loop.
    ///
    /// Resolves once the subscription is active; the returned handle
    /// completes when the loop exits (cancellation or closed stream).
    async fn consume(
        &self,
        handler: Arc<dyn TrackPlayHandler>,
        cancel: CancellationToken,
    ) -> Result<JoinHandle<()>, MessagingError>;

    /// Release the broker connection. Safe to call more than once.
    async fn close(&self) -> Result<(), MessagingError>;
}

/// What to do with a delivery after the decode-and-dispatch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Ack,
    Reject { requeue: bool },
}

/// Decode a payload and run the handler, returning the acknowledgment
/// decision. Separated from the delivery loop so the contract is testable
/// without a broker.
async fn dispatch(payload: &[u8], handler: &dyn TrackPlayHandler) -> Disposition {
    let event: TrackPlayedEvent = match serde_json::from_slice(payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "dropping undecodable message");
            return Disposition::Reject { requeue: false };
        }
    };

    tracing::debug!(
        playlist_id = event.playlist_id,
        track_id = event.track_id,
        position = event.position,
        "consumed track played event"
    );

    match handler.handle(event).await {
        Ok(()) => Disposition::Ack,
        Err(e) => {
            tracing::error!(error = %e, "handler failed, requeueing message");
            Disposition::Reject { requeue: true }
        }
    }
}

/// Primary [`EventConsumer`] backed by a dedicated AMQP connection.
pub struct AmqpEventConsumer {
    connection: Connection,
    channel: Channel,
    config: BrokerConfig,
}

impl AmqpEventConsumer {
    /// Connect to the broker and declare the exchange, the durable queue,
    /// and the binding between them.
    pub async fn connect(config: BrokerConfig) -> Result<Self, MessagingError> {
        let connection = Connection::connect(
            &config.url,
            ConnectionProperties::default().with_connection_name("jukebox-consumer".into()),
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

        channel
            .queue_declare(
                &config.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(MessagingError::Topology)?;

        channel
            .queue_bind(
                &config.queue,
                &config.exchange,
                &config.routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(MessagingError::Topology)?;

        tracing::info!(queue = %config.queue, "event consumer connected");

        Ok(Self {
            connection,
            channel,
            config,
        })
    }
}

#[async_trait]
impl EventConsumer for AmqpEventConsumer {
    async fn consume(
        &self,
        handler: Arc<dyn TrackPlayHandler>,
        cancel: CancellationToken,
    ) -> Result<JoinHandle<()>, MessagingError> {
        // Manual acknowledgment: BasicConsumeOptions defaults to no_ack = false.
        let mut deliveries = self
            .channel
            .basic_consume(
                &self.config.queue,
                "jukebox-recorder",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(MessagingError::Consume)?;

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("cancellation requested, consumer loop exiting");
                        break;
                    }
                    delivery = deliveries.next() => {
                        let Some(delivery) = delivery else {
                            tracing::warn!("broker delivery stream closed");
                            break;
                        };
                        let delivery = match delivery {
                            Ok(delivery) => delivery,
                            Err(e) => {
                                tracing::error!(error = %e, "delivery error from broker");
                                break;
                            }
                        };

                        let disposition = dispatch(&delivery.data, handler.as_ref()).await;
                        let settled = match disposition {
                            Disposition::Ack => delivery.ack(BasicAckOptions::default()).await,
                            Disposition::Reject { requeue } => {
                                delivery
                                    .nack(BasicNackOptions {
                                        requeue,
                                        ..Default::default()
                                    })
                                    .await
                            }
                        };
                        if let Err(e) = settled {
                            tracing::error!(error = %e, "failed to settle delivery");
                        }
                    }
                }
            }
        });

        Ok(handle)
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
