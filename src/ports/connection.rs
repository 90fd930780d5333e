//! Connection port - Interface for one client's bidirectional byte stream.
//!
//! The exchange never sees sockets, frames or handshakes. A transport
//! adapter (WebSocket, in-memory) wraps an already-established stream in a
//! [`Connection`], and the exchange moves opaque payloads through it.
//!
//! ## Sharing
//!
//! A connection is used by exactly two parties at once: its adapter task
//! (the only reader) and the event loop (writer and closer). Implementations
//! must allow a `read` to be pending while `write` or `close` run, and a
//! `close` must make any pending or future `read` fail.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::ConnectionId;

/// Errors that can occur on a client connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The peer disconnected or the connection was closed locally.
    #[error("Connection closed")]
    Closed,

    /// The underlying transport failed.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ConnectionError {
    pub fn transport(message: impl Into<String>) -> Self {
        ConnectionError::Transport(message.into())
    }
}

/// Port for a framed, full-duplex client stream.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Wait for the next inbound payload.
    ///
    /// Fails on disconnect, transport error, or after `close`.
    async fn read(&self) -> Result<Vec<u8>, ConnectionError>;

    /// Write one payload to the peer, waiting until the transport took it.
    async fn write(&self, payload: &[u8]) -> Result<(), ConnectionError>;

    /// Close the connection. Best-effort and idempotent.
    async fn close(&self);
}

/// A connection together with the ID of its current admission.
///
/// Cheap to clone; clones share the same underlying connection. Equality
/// is by ID.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    connection: Arc<dyn Connection>,
}

impl ConnectionHandle {
    /// Wrap a connection under a fresh ID.
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            id: ConnectionId::new(),
            connection,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub async fn read(&self) -> Result<Vec<u8>, ConnectionError> {
        self.connection.read().await
    }

    /// Write directly to this client, outside of any broadcast.
    pub async fn write(&self, payload: &[u8]) -> Result<(), ConnectionError> {
        self.connection.write(payload).await
    }

    pub async fn close(&self) {
        self.connection.close().await
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullConnection;

    #[async_trait]
    impl Connection for NullConnection {
        async fn read(&self) -> Result<Vec<u8>, ConnectionError> {
            Err(ConnectionError::Closed)
        }

        async fn write(&self, _payload: &[u8]) -> Result<(), ConnectionError> {
            Ok(())
        }

        async fn close(&self) {}
    }

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn Connection) {}

    #[test]
    fn handles_compare_by_id() {
        let connection: Arc<dyn Connection> = Arc::new(NullConnection);
        let a = ConnectionHandle::new(connection.clone());
        let b = ConnectionHandle::new(connection);

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn debug_shows_id() {
        let handle = ConnectionHandle::new(Arc::new(NullConnection));
        assert!(format!("{:?}", handle).contains(&handle.id().to_string()));
    }

    #[tokio::test]
    async fn handle_delegates_to_connection() {
        let handle = ConnectionHandle::new(Arc::new(NullConnection));
        assert_eq!(handle.read().await, Err(ConnectionError::Closed));
        assert!(handle.write(b"payload").await.is_ok());
    }
}
