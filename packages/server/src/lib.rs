//! Real-time conversation gateway.
//!
//! Authenticates WebSocket clients, tracks per-conversation room membership,
//! and relays chat messages to room peers after persisting them.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
