//! Exchange configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound on the event intake queue.
const MAX_INTAKE_CAPACITY: usize = 65_536;

/// Upper bound on the shutdown grace period, in seconds.
const MAX_SHUTDOWN_GRACE_SECS: u64 = 300;

/// Broadcast hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Events the loop's intake can hold before `publish` waits
    #[serde(default = "default_intake_capacity")]
    pub intake_capacity: usize,

    /// Largest inbound client message the transport accepts, in bytes
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// How long shutdown waits for adapters to report their eviction
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,

    /// Re-publish every client message to all clients
    #[serde(default)]
    pub relay_client_messages: bool,
}

impl ExchangeConfig {
    /// Get the shutdown grace period as a Duration
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Create config with custom intake capacity.
    pub fn with_intake_capacity(mut self, capacity: usize) -> Self {
        self.intake_capacity = capacity;
        self
    }

    /// Create config with custom shutdown grace period.
    pub fn with_shutdown_grace_secs(mut self, secs: u64) -> Self {
        self.shutdown_grace_secs = secs;
        self
    }

    /// Validate exchange configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.intake_capacity == 0 || self.intake_capacity > MAX_INTAKE_CAPACITY {
            return Err(ValidationError::InvalidIntakeCapacity);
        }
        if self.max_message_bytes == 0 {
            return Err(ValidationError::InvalidMaxMessageSize);
        }
        if self.shutdown_grace_secs == 0 || self.shutdown_grace_secs > MAX_SHUTDOWN_GRACE_SECS {
            return Err(ValidationError::InvalidShutdownGrace);
        }
        Ok(())
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            intake_capacity: default_intake_capacity(),
            max_message_bytes: default_max_message_bytes(),
            shutdown_grace_secs: default_shutdown_grace(),
            relay_client_messages: false,
        }
    }
}

fn default_intake_capacity() -> usize {
    32
}

fn default_max_message_bytes() -> usize {
    10 * 1024
}

fn default_shutdown_grace() -> u64 {
    10
}
