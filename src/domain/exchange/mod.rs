//! Exchange domain - the broadcast group's state.
//!
//! Pure types with no I/O: the active connection [`Registry`], the event
//! loop's [`ExchangeStatus`] state machine, and the vocabulary used to
//! report evictions and rejected events.

mod errors;
mod eviction;
mod registry;
mod status;

pub use errors::ExchangeError;
pub use eviction::{EvictionReason, RejectedEvent};
pub use registry::Registry;
pub use status::ExchangeStatus;

/// Outcome of a completed shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownSummary {
    /// Connections closed when shutdown began.
    pub closed: usize,
    /// Connections whose adapters reported eviction within the grace period.
    pub drained: usize,
    /// Connections removed because the grace period elapsed first.
    pub forced: usize,
    /// Size of the active set when the worker exited. Always zero.
    pub remaining: usize,
}
