//! Domain error types.

use thiserror::Error;

/// Handshake rejection reasons.
///
/// The `Display` output is the exact text surfaced to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    #[error("Authentication error: No token provided")]
    NoToken,

    #[error("Authentication error: Token is invalid")]
    InvalidToken,
}

/// Message Store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Store unreachable
    #[error("message store unavailable: {0}")]
    Unavailable(String),

    /// Write rejected, e.g. unknown sender or conversation
    #[error("message store rejected the write: {0}")]
    ConstraintViolation(String),
}

/// Room registry failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    /// The registry task has stopped (only happens during shutdown)
    #[error("room registry is closed")]
    RegistryClosed,

    /// The connection was never registered or has already been removed
    #[error("connection '{0}' is not registered")]
    UnknownConnection(String),
}

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("conversation id must not be empty")]
    EmptyConversationId,
}
