//! Consumer lifecycle management.
//!
//! [`ConsumerSupervisor`] owns the start/stop state machine around an
//! [`EventConsumer`]: Idle → Running → Stopping → Idle. State transitions
//! are serialized through a mutex; shutdown is driven by a pair of
//! cancellation tokens (external cancellation and an internal stop signal)
//! rather than ad hoc flags.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::consumer::{EventConsumer, TrackPlayHandler};
use crate::error::MessagingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SupervisorState {
    Idle,
    Running,
    Stopping,
}

/// Errors from supervisor lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("consumer supervisor is already running")]
    AlreadyRunning,

    #[error("failed to start consuming events: {0}")]
    Consumer(#[from] MessagingError),
}

struct Inner {
    state: SupervisorState,
    stop: Option<CancellationToken>,
    watcher: Option<JoinHandle<()>>,
}

/// Manages the lifecycle of the event consumer.
pub struct ConsumerSupervisor {
    consumer: Arc<dyn EventConsumer>,
    handler: Arc<dyn TrackPlayHandler>,
    inner: Arc<Mutex<Inner>>,
}

impl ConsumerSupervisor {
    pub fn new(consumer: Arc<dyn EventConsumer>, handler: Arc<dyn TrackPlayHandler>) -> Self {
        Self {
            consumer,
            handler,
            inner: Arc::new(Mutex::new(Inner {
                state: SupervisorState::Idle,
                stop: None,
                watcher: None,
            })),
        }
    }

    /// Start consuming events.
    ///
    /// Registers the handler with the consumer, then spawns a watcher that
    /// waits for either external cancellation (`cancel`) or an internal stop
    /// signal from [`stop`](Self::stop), drains the delivery loop, and
    /// returns the supervisor to Idle.
    ///
    /// Fails with [`SupervisorError::AlreadyRunning`] while not Idle; a
    /// second start is rejected, never queued.
    pub async fn start(&self, cancel: CancellationToken) -> Result<(), SupervisorError> {
        let mut inner = self.inner.lock().await;
        if inner.state != SupervisorState::Idle {
            return Err(SupervisorError::AlreadyRunning);
        }

        let loop_token = CancellationToken::new();
        let loop_handle = self
            .consumer
            .consume(Arc::clone(&self.handler), loop_token.clone())
            .await?;

        let stop = CancellationToken::new();
        inner.state = SupervisorState::Running;
        inner.stop = Some(stop.clone());

        let shared = Arc::clone(&self.inner);
        let watcher = tokio::spawn(async move {
            let external = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("cancellation requested, stopping track play consumer");
                    true
                }
                _ = stop.cancelled() => {
                    tracing::info!("stop requested, stopping track play consumer");
                    false
                }
            };

            // Stop pulling new messages, then wait for the delivery loop to
            // wind down. A handler already in flight is allowed to finish.
            loop_token.cancel();
            if let Err(e) = loop_handle.await {
                tracing::error!(error = %e, "consumer delivery loop panicked");
            }

            // On the stop path the Stopping -> Idle transition belongs to
            // stop(), which still has to close the connection.
            if external {
                shared.lock().await.state = SupervisorState::Idle;
            }
        });
        inner.watcher = Some(watcher);

        tracing::info!("track play consumer started");
        Ok(())
    }

    /// Stop consuming events and close the consumer's broker connection.
    ///
    /// No-op unless Running; safe to call multiple times.
    pub async fn stop(&self) {
        let (stop, watcher) = {
            let mut inner = self.inner.lock().await;
            if inner.state != SupervisorState::Running {
                return;
            }
            inner.state = SupervisorState::Stopping;
            (inner.stop.take(), inner.watcher.take())
        };

        if let Some(stop) = stop {
            stop.cancel();
        }
        if let Some(watcher) = watcher {
            if let Err(e) = watcher.await {
                tracing::error!(error = %e, "consumer watcher panicked");
            }
        }

        if let Err(e) = self.consumer.close().await {
            tracing::warn!(error = %e, "failed to close consumer connection");
        }

        let mut inner = self.inner.lock().await;
        if inner.state == SupervisorState::Stopping {
            inner.state = SupervisorState::Idle;
        }
        tracing::info!("track play consumer stopped");
    }

    /// Whether the supervisor currently holds a running consumer.
    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.state == SupervisorState::Running
    }
}
