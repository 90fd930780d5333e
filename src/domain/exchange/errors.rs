//! Exchange-specific error types.

use thiserror::Error;

/// Errors returned by the exchange facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// The exchange is shutting down or has stopped; the event was not
    /// accepted.
    #[error("Exchange is stopped")]
    Stopped,

    /// `stop` was already called on this exchange.
    #[error("Exchange stop was already requested")]
    AlreadyStopped,

    /// The connection is already in the active set under the same id.
    #[error("Connection is already admitted")]
    AlreadyAdmitted,

    /// The event loop task ended abnormally.
    #[error("Exchange worker failed: {0}")]
    WorkerFailed(String),
}

impl ExchangeError {
    pub fn worker_failed(message: impl Into<String>) -> Self {
        ExchangeError::WorkerFailed(message.into())
    }
}
