//! Message handler that re-broadcasts client payloads.

use async_trait::async_trait;

use crate::ports::{ConnectionHandle, MessageHandler};

use super::facade::Exchange;

/// Publishes every client payload to all clients, sender included.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelayHandler;

#[async_trait]
impl MessageHandler for RelayHandler {
    async fn handle(&self, payload: Vec<u8>, origin: &ConnectionHandle, exchange: &Exchange) {
        if let Err(e) = exchange.publish(payload).await {
            tracing::debug!(connection_id = %origin.id(), "Relay dropped payload: {}", e);
        }
    }
}
