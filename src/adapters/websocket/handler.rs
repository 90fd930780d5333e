//! WebSocket upgrade handler for exchange clients.
//!
//! Handles the HTTP → WebSocket upgrade and hands the upgraded socket to
//! the exchange, which owns it until it disconnects:
//! 1. Upgrade to WebSocket, capping inbound message size
//! 2. Wrap the socket as a `WebSocketConnection`
//! 3. Serve it on the exchange until it is evicted

use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::Exchange;

use super::connection::WebSocketConnection;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    /// The exchange every upgraded client joins.
    pub exchange: Exchange,
}

impl WebSocketState {
    /// Create a new WebSocket state.
    pub fn new(exchange: Exchange) -> Self {
        Self { exchange }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Every upgraded connection is admitted to the exchange and receives all
/// broadcasts until it disconnects or the exchange stops.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
    let max_message_bytes = state.exchange.config().max_message_bytes;

    ws.max_message_size(max_message_bytes)
        .on_upgrade(move |socket| async move {
            tracing::debug!("WebSocket client upgraded");
            state
                .exchange
                .serve(WebSocketConnection::new(socket))
                .await;
            tracing::debug!("WebSocket client session ended");
        })
}

/// Create axum router serving the exchange at `path`.
///
/// # Example
///
/// ```ignore
/// let app = websocket_router("/report", exchange.clone());
/// axum::serve(listener, app).await?;
/// ```
pub fn websocket_router(path: &str, exchange: Exchange) -> Router {
    Router::new()
        .route(path, get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(WebSocketState::new(exchange))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExchangeConfig;
    use crate::ports::NoopObserver;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn exchange() -> Exchange {
        Exchange::with_config(ExchangeConfig::default(), Arc::new(NoopObserver))
    }

    #[tokio::test]
    async fn websocket_state_shares_exchange() {
        let exchange = exchange();
        let state = WebSocketState::new(exchange.clone());

        state.exchange.stop().await.unwrap();
        assert!(exchange.is_stopping());
    }

    #[tokio::test]
    async fn plain_get_without_upgrade_is_rejected() {
        let exchange = exchange();
        let app = websocket_router("/report", exchange.clone());

        let response = app
            .oneshot(Request::builder().uri("/report").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        exchange.stop().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let exchange = exchange();
        let app = websocket_router("/report", exchange.clone());

        let response = app
            .oneshot(Request::builder().uri("/other").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        exchange.stop().await.unwrap();
    }
}
