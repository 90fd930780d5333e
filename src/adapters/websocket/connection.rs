//! WebSocket implementation of the connection port.
//!
//! Splits an upgraded axum [`WebSocket`] so the connection task can wait on
//! the read half while the event loop writes to and closes the write half.

use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::{watch, Mutex};

use crate::ports::{Connection, ConnectionError};

/// Upper bound on the close handshake.
const CLOSE_FRAME_TIMEOUT: Duration = Duration::from_secs(1);

/// An upgraded WebSocket serving as one exchange client.
///
/// Payloads that are valid UTF-8 go out as text frames, anything else as
/// binary. Inbound text and binary frames are both delivered as bytes;
/// ping and pong frames are answered by the transport and skipped.
pub struct WebSocketConnection {
    sender: Mutex<SplitSink<WebSocket, Message>>,
    receiver: Mutex<SplitStream<WebSocket>>,
    closed: watch::Sender<bool>,
}

impl WebSocketConnection {
    pub fn new(socket: WebSocket) -> Self {
        let (sender, receiver) = socket.split();
        let (closed, _) = watch::channel(false);
        Self {
            sender: Mutex::new(sender),
            receiver: Mutex::new(receiver),
            closed,
        }
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

/// Resolves once the close flag is set.
async fn closed_signal(mut closed: watch::Receiver<bool>) {
    loop {
        let is_closed = *closed.borrow_and_update();
        if is_closed || closed.changed().await.is_err() {
            return;
        }
    }
}

/// Lock and close `sink` within `limit`. A writer stuck on a stalled peer
/// holds the lock, so acquiring it counts against the limit too.
///
/// Returns false if the limit elapsed.
async fn close_sink<S, T>(sink: &Mutex<S>, limit: Duration) -> bool
where
    S: Sink<T> + Unpin,
{
    tokio::time::timeout(limit, async {
        let mut sink = sink.lock().await;
        let _ = <S as SinkExt<T>>::close(&mut *sink).await;
    })
    .await
    .is_ok()
}

/// Convert an outbound payload into a frame.
fn to_message(payload: &[u8]) -> Message {
    match std::str::from_utf8(payload) {
        Ok(text) => Message::Text(text.to_owned()),
        Err(_) => Message::Binary(payload.to_vec()),
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn read(&self) -> Result<Vec<u8>, ConnectionError> {
        let mut receiver = self.receiver.lock().await;
        loop {
            let next = tokio::select! {
                biased;
                _ = closed_signal(self.closed.subscribe()) => return Err(ConnectionError::Closed),
                next = receiver.next() => next,
            };

            match next {
                Some(Ok(Message::Text(text))) => return Ok(text.into_bytes()),
                Some(Ok(Message::Binary(data))) => return Ok(data),
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) | None => return Err(ConnectionError::Closed),
                Some(Err(e)) => return Err(ConnectionError::transport(e.to_string())),
            }
        }
    }

    async fn write(&self, payload: &[u8]) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }
        self.sender
            .lock()
            .await
            .send(to_message(payload))
            .await
            .map_err(|e| ConnectionError::transport(e.to_string()))
    }

    async fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        if !close_sink::<_, Message>(&self.sender, CLOSE_FRAME_TIMEOUT).await {
            tracing::debug!("WebSocket close handshake timed out");
        }
    }
}
