//! Why a connection left the active set.

use std::fmt;

/// Cause of a connection's removal from the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionReason {
    /// A broadcast write to the connection failed.
    WriteFailed,
    /// The connection's adapter reported a read failure or disconnect.
    ReadFailed,
    /// The adapter went away before its admission was acknowledged.
    AdmissionAbandoned,
    /// Still present when the shutdown grace period elapsed.
    ShutdownForced,
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvictionReason::WriteFailed => "write_failed",
            EvictionReason::ReadFailed => "read_failed",
            EvictionReason::AdmissionAbandoned => "admission_abandoned",
            EvictionReason::ShutdownForced => "shutdown_forced",
        };
        write!(f, "{}", s)
    }
}

/// Kind of event turned away because the exchange was no longer running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectedEvent {
    Admit,
    Broadcast,
    Shutdown,
}

impl fmt::Display for RejectedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectedEvent::Admit => "admit",
            RejectedEvent::Broadcast => "broadcast",
            RejectedEvent::Shutdown => "shutdown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_display_as_snake_case() {
        assert_eq!(EvictionReason::WriteFailed.to_string(), "write_failed");
        assert_eq!(EvictionReason::ShutdownForced.to_string(), "shutdown_forced");
        assert_eq!(RejectedEvent::Broadcast.to_string(), "broadcast");
    }
}
