//! UI layer: HTTP/WebSocket transport.

mod handler;
pub mod origin;
mod server;
mod signal;
pub mod state;

pub use origin::{AllowedOrigins, InvalidOriginError};
pub use server::{Server, ServerError};
pub use signal::shutdown_signal;
