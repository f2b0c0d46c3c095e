//! Terminal client for the conversation gateway.

mod domain;
pub mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use error::ClientError;
pub use runner::run_client;
pub use session::SessionConfig;
