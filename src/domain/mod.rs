//! Domain layer containing the exchange's state and value types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, state machine trait)
//! - `exchange` - Active connection registry and event loop lifecycle

pub mod exchange;
pub mod foundation;
