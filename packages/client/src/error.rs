//! Error types for the terminal client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The gateway refused the handshake (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
