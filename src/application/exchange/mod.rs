//! Exchange application service - the broadcast hub's runtime.
//!
//! - [`Exchange`] - facade for publishing, serving connections and stopping
//! - `event_loop` - the serial worker that owns the active set
//! - `connection_task` - the per-connection read loop
//! - [`RelayHandler`] - message handler that re-broadcasts client payloads

mod connection_task;
mod event_loop;
mod facade;
mod relay;

pub use facade::Exchange;
pub use relay::RelayHandler;
