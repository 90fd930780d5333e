//! In-memory connection for testing.
//!
//! A [`MemoryConnection`] is the exchange's side of a fake client stream;
//! its [`MemoryPeer`] plays the client. Delivery is immediate and
//! unbounded, so writes never block.
//!
//! # Example
//!
//! ```ignore
//! let (connection, mut peer) = MemoryConnection::pair();
//! tokio::spawn(async move { exchange.serve(connection).await });
//!
//! peer.send(b"ping".to_vec());
//! let broadcast = peer.recv().await;
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};

use crate::ports::{Connection, ConnectionError};

/// Exchange-side half of an in-memory client stream.
pub struct MemoryConnection {
    inbound: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    closed: watch::Sender<bool>,
    broken: Arc<AtomicBool>,
}

/// Client-side half of an in-memory stream.
pub struct MemoryPeer {
    to_exchange: Option<mpsc::UnboundedSender<Vec<u8>>>,
    from_exchange: mpsc::UnboundedReceiver<Vec<u8>>,
    closed: watch::Receiver<bool>,
    broken: Arc<AtomicBool>,
}

impl MemoryConnection {
    /// Create a connected pair.
    pub fn pair() -> (MemoryConnection, MemoryPeer) {
        let (to_exchange, inbound) = mpsc::unbounded_channel();
        let (outbound, from_exchange) = mpsc::unbounded_channel();
        let (closed, closed_rx) = watch::channel(false);
        let broken = Arc::new(AtomicBool::new(false));

        let connection = MemoryConnection {
            inbound: Mutex::new(inbound),
            outbound,
            closed,
            broken: broken.clone(),
        };
        let peer = MemoryPeer {
            to_exchange: Some(to_exchange),
            from_exchange,
            closed: closed_rx,
            broken,
        };
        (connection, peer)
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

/// Resolves once the watched flag turns true or its sender is gone.
async fn wait_closed(mut closed: watch::Receiver<bool>) {
    loop {
        let is_closed = *closed.borrow_and_update();
        if is_closed || closed.changed().await.is_err() {
            return;
        }
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn read(&self) -> Result<Vec<u8>, ConnectionError> {
        let closed = self.closed.subscribe();
        let mut inbound = self.inbound.lock().await;
        tokio::select! {
            biased;
            _ = wait_closed(closed) => Err(ConnectionError::Closed),
            payload = inbound.recv() => payload.ok_or(ConnectionError::Closed),
        }
    }

    async fn write(&self, payload: &[u8]) -> Result<(), ConnectionError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(ConnectionError::transport("broken pipe"));
        }
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }
        self.outbound
            .send(payload.to_vec())
            .map_err(|_| ConnectionError::Closed)
    }

    async fn close(&self) {
        self.closed.send_replace(true);
    }
}

impl MemoryPeer {
    /// Send a payload to the exchange. Returns false once disconnected.
    pub fn send(&self, payload: Vec<u8>) -> bool {
        self.to_exchange
            .as_ref()
            .map(|tx| tx.send(payload).is_ok())
            .unwrap_or(false)
    }

    /// Next payload written by the exchange, or `None` once the exchange
    /// side is dropped.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.from_exchange.recv().await
    }

    /// Payload already delivered, without waiting.
    pub fn try_recv(&mut self) -> Option<Vec<u8>> {
        self.from_exchange.try_recv().ok()
    }

    /// Hang up: the exchange's next read fails.
    pub fn disconnect(&mut self) {
        self.to_exchange = None;
    }

    /// Simulate a broken stream: every later write by the exchange fails.
    pub fn break_stream(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// Returns true once the exchange closed its side.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_reaches_peer() {
        let (conn, mut peer) = MemoryConnection::pair();
        conn.write(b"hello").await.unwrap();
        assert_eq!(peer.recv().await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn peer_send_is_read_by_exchange() {
        let (conn, peer) = MemoryConnection::pair();
        assert!(peer.send(b"ping".to_vec()));
        assert_eq!(conn.read().await.unwrap(), b"ping");
    }

    #[tokio::test]
    async fn close_unblocks_pending_read() {
        let (conn, _peer) = MemoryConnection::pair();
        let conn = Arc::new(conn);
        let reader = tokio::spawn({
            let conn = conn.clone();
            async move { conn.read().await }
        });

        tokio::task::yield_now().await;
        conn.close().await;

        assert_eq!(reader.await.unwrap(), Err(ConnectionError::Closed));
    }

    #[tokio::test]
    async fn read_after_close_fails_immediately() {
        let (conn, peer) = MemoryConnection::pair();
        peer.send(b"queued".to_vec());
        conn.close().await;
        assert_eq!(conn.read().await, Err(ConnectionError::Closed));
        assert!(peer.is_closed());
    }

    #[tokio::test]
    async fn disconnect_fails_read() {
        let (conn, mut peer) = MemoryConnection::pair();
        peer.disconnect();
        assert_eq!(conn.read().await, Err(ConnectionError::Closed));
        assert!(!peer.send(b"gone".to_vec()));
    }

    #[tokio::test]
    async fn broken_stream_fails_writes() {
        let (conn, mut peer) = MemoryConnection::pair();
        peer.break_stream();
        assert!(matches!(
            conn.write(b"lost").await,
            Err(ConnectionError::Transport(_))
        ));
        assert!(peer.try_recv().is_none());
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (conn, peer) = MemoryConnection::pair();
        conn.close().await;
        conn.close().await;
        assert!(peer.is_closed());
        assert_eq!(conn.write(b"late").await, Err(ConnectionError::Closed));
    }
}
