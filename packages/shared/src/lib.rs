//! Utilities shared between the quadchat server and client.

pub mod logger;
pub mod time;
