//! Observability adapters for the [`ExchangeObserver`](crate::ports::ExchangeObserver) port.
//!
//! - [`TracingObserver`] - structured `tracing` events
//! - [`ExchangeMetrics`] - atomic counters with snapshots
//! - [`CompositeObserver`] - fan-out to several observers

mod composite;
mod metrics;
mod tracing_observer;

pub use composite::CompositeObserver;
pub use metrics::{ExchangeMetrics, MetricsSnapshot};
pub use tracing_observer::TracingObserver;
