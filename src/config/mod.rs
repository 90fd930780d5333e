//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `SOCKET_EXCHANGE`
//! prefix and `__` separates nested values. Every value has a default,
//! so the service starts with an empty environment.
//!
//! # Example
//!
//! ```no_run
//! use socket_exchange::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Serving {} on port {}", config.server.path, config.server.port);
//! ```

mod error;
mod exchange;
mod server;

pub use error::{ConfigError, ValidationError};
pub use exchange::ExchangeConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, route)
    #[serde(default)]
    pub server: ServerConfig,

    /// Broadcast hub configuration (intake, message size, shutdown)
    #[serde(default)]
    pub exchange: ExchangeConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SOCKET_EXCHANGE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SOCKET_EXCHANGE__SERVER__PORT=9000` -> `server.port = 9000`
    /// - `SOCKET_EXCHANGE__EXCHANGE__INTAKE_CAPACITY=1` -> `exchange.intake_capacity = 1`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SOCKET_EXCHANGE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// `ConfigError::ValidationFailed` naming the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.exchange.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
