//! Data Transfer Objects.
//!
//! DTOs are organized by protocol:
//! - `websocket`: gateway event frames
//! - `http`: HTTP API response bodies

pub mod conversion;
pub mod http;
pub mod websocket;
