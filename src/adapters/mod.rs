//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the exchange to external systems:
//! - `websocket` - axum WebSocket transport
//! - `memory` - in-memory connection pairs for tests
//! - `observability` - `tracing` and counter observers

pub mod memory;
pub mod observability;
pub mod websocket;

pub use memory::{MemoryConnection, MemoryPeer};
pub use observability::{CompositeObserver, ExchangeMetrics, MetricsSnapshot, TracingObserver};
pub use websocket::{websocket_router, WebSocketConnection, WebSocketState};
