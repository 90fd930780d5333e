//! Per-connection adapter task.
//!
//! Bridges one connection's reads into exchange events:
//! 1. Admit the connection and wait for the loop to confirm
//!    (a handle that is already being served is left alone)
//! 2. Read until failure, handing each payload to the message handler
//! 3. Report eviction and return
//!
//! The task never closes an admitted connection itself. The loop closes on
//! broadcast failure and shutdown; a peer disconnect needs no close.

use crate::domain::exchange::ExchangeError;
use crate::ports::ConnectionHandle;

use super::facade::Exchange;

pub(crate) async fn run(exchange: Exchange, connection: ConnectionHandle) {
    let id = connection.id();

    match exchange.admit(connection.clone()).await {
        Ok(()) => {}
        // Another task already serves this handle.
        Err(ExchangeError::AlreadyAdmitted) => return,
        Err(_) => {
            // Never admitted, so nobody else will close it.
            connection.close().await;
            return;
        }
    }

    loop {
        match connection.read().await {
            Ok(payload) => {
                exchange.observer().message_received(&id, payload.len());
                if let Some(handler) = exchange.message_handler().await {
                    handler.handle(payload, &connection, &exchange).await;
                }
            }
            Err(_) => {
                // Best-effort: fails immediately if the loop already exited.
                let _ = exchange.evict(id).await;
                break;
            }
        }
    }
}
