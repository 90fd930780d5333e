//! Counter-based observer.
//!
//! Lock-free atomic counters that can be read at any time through
//! [`ExchangeMetrics::snapshot`]. Also the observer the test suite uses to
//! wait for the event loop to reach a given state.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::domain::exchange::{EvictionReason, ExchangeStatus, RejectedEvent};
use crate::domain::foundation::ConnectionId;
use crate::ports::ExchangeObserver;

/// Point-in-time copy of [`ExchangeMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Connections currently in the active set.
    pub active: usize,
    pub admitted: u64,
    pub evicted: u64,
    pub broadcasts: u64,
    /// Successful per-connection writes across all broadcasts.
    pub deliveries: u64,
    pub write_failures: u64,
    pub messages_received: u64,
    pub rejected: u64,
    /// True once the event loop reached `Stopped`.
    pub stopped: bool,
}

/// Atomic counters fed by the event loop.
#[derive(Debug, Default)]
pub struct ExchangeMetrics {
    active: AtomicUsize,
    admitted: AtomicU64,
    evicted: AtomicU64,
    broadcasts: AtomicU64,
    deliveries: AtomicU64,
    write_failures: AtomicU64,
    messages_received: AtomicU64,
    rejected: AtomicU64,
    stopped: AtomicBool,
}

impl ExchangeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active: self.active.load(Ordering::SeqCst),
            admitted: self.admitted.load(Ordering::SeqCst),
            evicted: self.evicted.load(Ordering::SeqCst),
            broadcasts: self.broadcasts.load(Ordering::SeqCst),
            deliveries: self.deliveries.load(Ordering::SeqCst),
            write_failures: self.write_failures.load(Ordering::SeqCst),
            messages_received: self.messages_received.load(Ordering::SeqCst),
            rejected: self.rejected.load(Ordering::SeqCst),
            stopped: self.stopped.load(Ordering::SeqCst),
        }
    }
}

impl ExchangeObserver for ExchangeMetrics {
    fn connection_admitted(&self, _id: &ConnectionId, active: usize) {
        self.admitted.fetch_add(1, Ordering::SeqCst);
        self.active.store(active, Ordering::SeqCst);
    }

    fn connection_evicted(&self, _id: &ConnectionId, _reason: EvictionReason, active: usize) {
        self.evicted.fetch_add(1, Ordering::SeqCst);
        self.active.store(active, Ordering::SeqCst);
    }

    fn write_failed(&self, _id: &ConnectionId, _error: &str) {
        self.write_failures.fetch_add(1, Ordering::SeqCst);
    }

    fn broadcast_completed(&self, _payload_len: usize, delivered: usize, _failed: usize) {
        self.broadcasts.fetch_add(1, Ordering::SeqCst);
        self.deliveries.fetch_add(delivered as u64, Ordering::SeqCst);
    }

    fn message_received(&self, _id: &ConnectionId, _payload_len: usize) {
        self.messages_received.fetch_add(1, Ordering::SeqCst);
    }

    fn event_rejected(&self, _event: RejectedEvent) {
        self.rejected.fetch_add(1, Ordering::SeqCst);
    }

    fn status_changed(&self, _from: ExchangeStatus, to: ExchangeStatus) {
        if to == ExchangeStatus::Stopped {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }
}
