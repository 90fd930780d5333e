//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the exchange and the outside world. Adapters implement these ports.
//!
//! - `Connection` - One client's framed, full-duplex byte stream
//! - `MessageHandler` - Optional callback for client-sent payloads
//! - `ExchangeObserver` - Observability hook for the event loop

mod connection;
mod exchange_observer;
mod message_handler;

pub use connection::{Connection, ConnectionError, ConnectionHandle};
pub use exchange_observer::{ExchangeObserver, NoopObserver};
pub use message_handler::MessageHandler;
