//! Application layer - Runtime services that coordinate ports.
//!
//! The exchange wires the domain registry to connections, callbacks and
//! observers through Tokio tasks and channels.

pub mod exchange;

pub use exchange::{Exchange, RelayHandler};
