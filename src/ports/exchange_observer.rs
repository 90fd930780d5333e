//! ExchangeObserver port - Observability hook for the event loop.
//!
//! The event loop and connection adapters report what they did through
//! this trait instead of logging inline. Adapters turn the callbacks into
//! `tracing` events or counters.
//!
//! Callbacks run on the reporting task (usually the event loop itself), so
//! implementations must return quickly and never block.

use crate::domain::exchange::{EvictionReason, ExchangeStatus, RejectedEvent};
use crate::domain::foundation::ConnectionId;

/// Observer for exchange activity. Every method defaults to a no-op.
pub trait ExchangeObserver: Send + Sync {
    /// A connection joined the active set, which now has `active` entries.
    fn connection_admitted(&self, _id: &ConnectionId, _active: usize) {}

    /// A connection left the active set.
    fn connection_evicted(&self, _id: &ConnectionId, _reason: EvictionReason, _active: usize) {}

    /// A broadcast write to one connection failed.
    fn write_failed(&self, _id: &ConnectionId, _error: &str) {}

    /// A broadcast pass finished.
    fn broadcast_completed(&self, _payload_len: usize, _delivered: usize, _failed: usize) {}

    /// A client sent a payload.
    fn message_received(&self, _id: &ConnectionId, _payload_len: usize) {}

    /// An event arrived after the exchange stopped running.
    fn event_rejected(&self, _event: RejectedEvent) {}

    /// The event loop changed lifecycle status.
    fn status_changed(&self, _from: ExchangeStatus, _to: ExchangeStatus) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExchangeObserver for NoopObserver {}
