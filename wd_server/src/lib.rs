//! Word duel game server library.
//!
//! Exposes the HTTP/WebSocket API and configuration so integration tests can
//! drive the router directly.

pub mod api;
pub mod config;
