//! Observer that turns exchange activity into `tracing` events.

use crate::domain::exchange::{EvictionReason, ExchangeStatus, RejectedEvent};
use crate::domain::foundation::ConnectionId;
use crate::ports::ExchangeObserver;

/// Emits structured `tracing` events under the `socket_exchange::exchange`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl ExchangeObserver for TracingObserver {
    fn connection_admitted(&self, id: &ConnectionId, active: usize) {
        tracing::debug!(
            target: "socket_exchange::exchange",
            connection_id = %id,
            active,
            "Connection admitted"
        );
    }

    fn connection_evicted(&self, id: &ConnectionId, reason: EvictionReason, active: usize) {
        tracing::debug!(
            target: "socket_exchange::exchange",
            connection_id = %id,
            %reason,
            active,
            "Connection evicted"
        );
    }

    fn write_failed(&self, id: &ConnectionId, error: &str) {
        tracing::debug!(
            target: "socket_exchange::exchange",
            connection_id = %id,
            error,
            "Broadcast write failed"
        );
    }

    fn broadcast_completed(&self, payload_len: usize, delivered: usize, failed: usize) {
        tracing::trace!(
            target: "socket_exchange::exchange",
            payload_len,
            delivered,
            failed,
            "Broadcast completed"
        );
    }

    fn message_received(&self, id: &ConnectionId, payload_len: usize) {
        tracing::trace!(
            target: "socket_exchange::exchange",
            connection_id = %id,
            payload_len,
            "Client message received"
        );
    }

    fn event_rejected(&self, event: RejectedEvent) {
        tracing::warn!(
            target: "socket_exchange::exchange",
            %event,
            "Event rejected, exchange is no longer running"
        );
    }

    fn status_changed(&self, from: ExchangeStatus, to: ExchangeStatus) {
        tracing::info!(
            target: "socket_exchange::exchange",
            %from,
            %to,
            "Exchange status changed"
        );
    }
}
