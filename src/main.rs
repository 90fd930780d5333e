//! Socket Exchange server.
//!
//! Serves the broadcast hub over WebSocket until Ctrl-C, then stops
//! accepting upgrades and drains the exchange.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use socket_exchange::adapters::{websocket_router, CompositeObserver, ExchangeMetrics, TracingObserver};
use socket_exchange::application::{Exchange, RelayHandler};
use socket_exchange::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let metrics = Arc::new(ExchangeMetrics::new());
    let observer = CompositeObserver::new()
        .with(Arc::new(TracingObserver::new()))
        .with(metrics.clone());
    let exchange = Exchange::with_config(config.exchange.clone(), Arc::new(observer));

    if config.exchange.relay_client_messages {
        exchange.set_message_handler(Arc::new(RelayHandler)).await;
    }

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, path = %config.server.path, "Socket exchange listening");

    // Upgraded sockets must be closed before axum's graceful shutdown can finish.
    let shutdown = {
        let exchange = exchange.clone();
        async move {
            shutdown_signal().await;
            match exchange.stop().await {
                Ok(summary) => tracing::info!(
                    closed = summary.closed,
                    drained = summary.drained,
                    forced = summary.forced,
                    stats = ?metrics.snapshot(),
                    "Socket exchange stopped"
                ),
                Err(e) => tracing::error!("Exchange shutdown failed: {}", e),
            }
        }
    };

    axum::serve(listener, websocket_router(&config.server.path, exchange))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, stopping exchange");
}
