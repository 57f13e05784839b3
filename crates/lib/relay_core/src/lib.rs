//! # relay_core
//!
//! Core domain logic for the chat relay: wire entities, the client-facing
//! error taxonomy, relay configuration and the downstream completion client.

pub mod config;
pub mod downstream;
pub mod models;
pub mod taxonomy;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
