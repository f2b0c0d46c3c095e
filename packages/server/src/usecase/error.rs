//! UseCase error types.

use thiserror::Error;

use crate::domain::{MembershipError, StorageError};

/// Relay failures.
///
/// Neither variant is reported to the sender; the caller logs and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Persistence failed, nothing was broadcast
    #[error("message was not persisted: {0}")]
    Storage(#[from] StorageError),

    /// Persisted, but the registry could not be reached for the broadcast
    #[error("message was persisted but not broadcast: {0}")]
    Membership(#[from] MembershipError),
}
