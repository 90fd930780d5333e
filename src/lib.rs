//! Socket Exchange - broadcast hub for full-duplex WebSocket clients.
//!
//! Every connected client receives every payload published to the
//! exchange; clients may send payloads back through an optional
//! message handler.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::Exchange;
