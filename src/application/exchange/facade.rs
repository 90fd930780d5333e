//! Exchange - the public face of the broadcast hub.
//!
//! A cheap-to-clone handle over the event loop's intake. Producers call
//! [`Exchange::publish`], transports hand accepted connections to
//! [`Exchange::serve`], and the owner ends everything with
//! [`Exchange::stop`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::adapters::observability::TracingObserver;
use crate::config::ExchangeConfig;
use crate::domain::exchange::{ExchangeError, ShutdownSummary};
use crate::domain::foundation::ConnectionId;
use crate::ports::{Connection, ConnectionHandle, ExchangeObserver, MessageHandler};

use super::connection_task;
use super::event_loop::{EventLoop, ExchangeEvent};

/// Handle to a running broadcast hub.
///
/// Every clone talks to the same event loop. Construction spawns the loop
/// on the current Tokio runtime, so it must be called from within one.
///
/// # Example
///
/// ```ignore
/// let exchange = Exchange::new();
/// tokio::spawn({
///     let exchange = exchange.clone();
///     async move { exchange.serve(connection).await }
/// });
/// exchange.publish("hello world").await?;
/// exchange.stop().await?;
/// ```
#[derive(Clone)]
pub struct Exchange {
    inner: Arc<ExchangeInner>,
}

struct ExchangeInner {
    events: mpsc::Sender<ExchangeEvent>,
    message_handler: RwLock<Option<Arc<dyn MessageHandler>>>,
    observer: Arc<dyn ExchangeObserver>,
    config: ExchangeConfig,
    stopping: AtomicBool,
    worker: Mutex<Option<JoinHandle<ShutdownSummary>>>,
}

impl Exchange {
    /// Create an exchange with default configuration that reports through
    /// `tracing`.
    pub fn new() -> Self {
        Self::with_config(ExchangeConfig::default(), Arc::new(TracingObserver::new()))
    }

    /// Create an exchange with custom configuration and observer.
    pub fn with_config(config: ExchangeConfig, observer: Arc<dyn ExchangeObserver>) -> Self {
        let (events, intake) = mpsc::channel(config.intake_capacity.max(1));
        let worker = tokio::spawn(
            EventLoop::new(intake, observer.clone(), config.shutdown_grace()).run(),
        );

        Self {
            inner: Arc::new(ExchangeInner {
                events,
                message_handler: RwLock::new(None),
                observer,
                config,
                stopping: AtomicBool::new(false),
                worker: Mutex::new(Some(worker)),
            }),
        }
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.inner.config
    }

    /// Broadcast a payload to every connected client.
    ///
    /// Returns once the event loop's intake accepted the payload, not once
    /// clients received it. Waits while the intake is full.
    ///
    /// # Errors
    ///
    /// `ExchangeError::Stopped` once `stop` has been called.
    pub async fn publish(&self, payload: impl Into<Vec<u8>>) -> Result<(), ExchangeError> {
        if self.is_stopping() {
            return Err(ExchangeError::Stopped);
        }
        self.submit(ExchangeEvent::Broadcast(payload.into())).await
    }

    /// Shut the exchange down and wait for the event loop to finish.
    ///
    /// Every connected client is closed; the returned summary reports how
    /// the active set drained.
    ///
    /// # Errors
    ///
    /// `ExchangeError::AlreadyStopped` if called more than once.
    pub async fn stop(&self) -> Result<ShutdownSummary, ExchangeError> {
        if self.inner.stopping.swap(true, Ordering::SeqCst) {
            return Err(ExchangeError::AlreadyStopped);
        }

        // A closed intake means the loop already exited; joining still
        // yields its summary.
        let _ = self.inner.events.send(ExchangeEvent::Shutdown).await;

        let worker = self.inner.worker.lock().await.take();
        match worker {
            Some(worker) => worker
                .await
                .map_err(|e| ExchangeError::worker_failed(e.to_string())),
            None => Err(ExchangeError::AlreadyStopped),
        }
    }

    /// Returns true once `stop` has been called.
    pub fn is_stopping(&self) -> bool {
        self.inner.stopping.load(Ordering::SeqCst)
    }

    /// Install the callback for client-sent payloads, replacing any
    /// previous one.
    pub async fn set_message_handler(&self, handler: Arc<dyn MessageHandler>) {
        *self.inner.message_handler.write().await = Some(handler);
    }

    /// Remove the callback; client payloads are discarded afterwards.
    pub async fn clear_message_handler(&self) {
        *self.inner.message_handler.write().await = None;
    }

    pub(crate) async fn message_handler(&self) -> Option<Arc<dyn MessageHandler>> {
        self.inner.message_handler.read().await.clone()
    }

    pub(crate) fn observer(&self) -> &Arc<dyn ExchangeObserver> {
        &self.inner.observer
    }

    /// Run one client connection until it ends.
    ///
    /// Admits the connection, then reads from it until it fails, handing
    /// each payload to the message handler. Resolves after the connection
    /// has been evicted.
    pub async fn serve<C>(&self, connection: C)
    where
        C: Connection + 'static,
    {
        self.serve_handle(ConnectionHandle::new(Arc::new(connection)))
            .await
    }

    /// Like [`Exchange::serve`], for a connection that is already wrapped.
    pub async fn serve_handle(&self, connection: ConnectionHandle) {
        connection_task::run(self.clone(), connection).await
    }

    /// Ask the loop to add a connection and wait until it did.
    pub(crate) async fn admit(&self, connection: ConnectionHandle) -> Result<(), ExchangeError> {
        if self.is_stopping() {
            return Err(ExchangeError::Stopped);
        }
        let (ack, acked) = oneshot::channel();
        self.submit(ExchangeEvent::Admit { connection, ack }).await?;
        acked.await.map_err(|_| ExchangeError::Stopped)?
    }

    /// Report that a connection is gone. Fails fast once the loop exited.
    pub(crate) async fn evict(&self, id: ConnectionId) -> Result<(), ExchangeError> {
        self.submit(ExchangeEvent::Evict(id)).await
    }

    async fn submit(&self, event: ExchangeEvent) -> Result<(), ExchangeError> {
        self.inner
            .events
            .send(event)
            .await
            .map_err(|_| ExchangeError::Stopped)
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}
