//! Real-time presence and room messaging engine.
//!
//! Keeps many long-lived WebSocket connections alive, groups them into
//! rooms, tracks per-connection liveness, fans events out to the correct
//! subset of connections, and keeps toggle-style actions (reactions, read
//! receipts) safe under concurrent access. Message persistence and
//! identity verification are external collaborators behind the ports in
//! [`domain::ports`].

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
