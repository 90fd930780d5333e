//! WebSocket transport adapter.
//!
//! Exposes the exchange behind an axum WebSocket upgrade endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  GET /report  (Upgrade: websocket)                           │
//! │     ws_handler ── on_upgrade ──► WebSocketConnection         │
//! └──────────────────────────────────────────────────────────────┘
//!                              │ Exchange::serve
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  connection task ── admit / evict ──► event loop             │
//! │        │                                  │                  │
//! │        └─ MessageHandler                  └─ broadcast writes│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`connection`] - `Connection` port implementation over an axum socket
//! - [`handler`] - Upgrade handler and router

pub mod connection;
pub mod handler;

pub use connection::WebSocketConnection;
pub use handler::{websocket_router, ws_handler, WebSocketState};
