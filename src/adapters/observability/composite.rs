//! Fan-out observer.

use std::sync::Arc;

use crate::domain::exchange::{EvictionReason, ExchangeStatus, RejectedEvent};
use crate::domain::foundation::ConnectionId;
use crate::ports::ExchangeObserver;

/// Forwards every callback to each inner observer, in order.
#[derive(Default, Clone)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ExchangeObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer to the end of the chain.
    pub fn with(mut self, observer: Arc<dyn ExchangeObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl ExchangeObserver for CompositeObserver {
    fn connection_admitted(&self, id: &ConnectionId, active: usize) {
        for observer in &self.observers {
            observer.connection_admitted(id, active);
        }
    }

    fn connection_evicted(&self, id: &ConnectionId, reason: EvictionReason, active: usize) {
        for observer in &self.observers {
            observer.connection_evicted(id, reason, active);
        }
    }

    fn write_failed(&self, id: &ConnectionId, error: &str) {
        for observer in &self.observers {
            observer.write_failed(id, error);
        }
    }

    fn broadcast_completed(&self, payload_len: usize, delivered: usize, failed: usize) {
        for observer in &self.observers {
            observer.broadcast_completed(payload_len, delivered, failed);
        }
    }

    fn message_received(&self, id: &ConnectionId, payload_len: usize) {
        for observer in &self.observers {
            observer.message_received(id, payload_len);
        }
    }

    fn event_rejected(&self, event: RejectedEvent) {
        for observer in &self.observers {
            observer.event_rejected(event);
        }
    }

    fn status_changed(&self, from: ExchangeStatus, to: ExchangeStatus) {
        for observer in &self.observers {
            observer.status_changed(from, to);
        }
    }
}
