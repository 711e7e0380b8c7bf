//! Shared utilities for the Atelier realtime workspace.
//!
//! Holds the pieces that are useful to any member crate: the clock
//! abstraction used by the engine's liveness and expiry logic, and the
//! tracing setup used by every binary.

pub mod logger;
pub mod time;
