//! Transport layer: axum router, WebSocket session lifecycle, and the
//! HTTP side endpoints.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
