//! MessageHandler port - Callback for payloads sent by clients.

use async_trait::async_trait;

use crate::application::exchange::Exchange;

use super::ConnectionHandle;

/// Receives every payload a client sends to the exchange.
///
/// Invoked from the sending connection's adapter task, never from the
/// event loop, so calls for different connections run concurrently.
/// Implementations must be stateless or synchronize internally.
///
/// The handler may reply to the origin through
/// [`ConnectionHandle::write`] or broadcast through
/// [`Exchange::publish`].
///
/// # Example
///
/// ```ignore
/// struct Relay;
///
/// #[async_trait]
/// impl MessageHandler for Relay {
///     async fn handle(&self, payload: Vec<u8>, _origin: &ConnectionHandle, exchange: &Exchange) {
///         let _ = exchange.publish(payload).await;
///     }
/// }
/// ```
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: Vec<u8>, origin: &ConnectionHandle, exchange: &Exchange);
}
