//! Foundation module - Shared domain primitives.
//!
//! Identifiers, error types and the state machine trait used by the
//! exchange domain.

mod errors;
mod ids;
mod state_machine;

pub use errors::ValidationError;
pub use ids::ConnectionId;
pub use state_machine::StateMachine;
