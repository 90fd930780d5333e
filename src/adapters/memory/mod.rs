//! In-memory transport adapter.
//!
//! Connection pairs backed by channels, used as the test double for the
//! [`Connection`](crate::ports::Connection) port.

mod connection;

pub use connection::{MemoryConnection, MemoryPeer};
