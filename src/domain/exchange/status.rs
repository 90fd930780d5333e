//! ExchangeStatus enum for tracking the lifecycle of the event loop.

use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of an exchange's event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExchangeStatus {
    /// Admitting connections and broadcasting.
    #[default]
    Running,
    /// Shutdown requested; waiting for outstanding evictions to settle.
    Draining,
    /// Terminal. The worker has exited.
    Stopped,
}

impl ExchangeStatus {
    /// Returns true if new connections and broadcasts are accepted.
    pub fn accepts_events(&self) -> bool {
        matches!(self, ExchangeStatus::Running)
    }
}

impl StateMachine for ExchangeStatus {
    /// Valid transitions:
    /// - Running -> Draining (shutdown requested)
    /// - Running -> Stopped (intake closed with nothing to drain)
    /// - Draining -> Stopped
    fn can_transition_to(&self, target: &Self) -> bool {
        use ExchangeStatus::*;
        matches!(
            (self, target),
            (Running, Draining) | (Running, Stopped) | (Draining, Stopped)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ExchangeStatus::*;
        match self {
            Running => vec![Draining, Stopped],
            Draining => vec![Stopped],
            Stopped => vec![],
        }
    }
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExchangeStatus::Running => "running",
            ExchangeStatus::Draining => "draining",
            ExchangeStatus::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}
