//! Connection lifecycle.
//!
//! ```text
//! Connecting ──valid token──▶ Authenticated(user)
//!     │
//!     └──missing / invalid token──▶ Rejected   (terminal, socket closed)
//! ```
//!
//! There is no way back to `Connecting`, and an authenticated connection
//! keeps its user id for its whole lifetime.

use super::value_object::{ConnectionId, UserId};

/// Handshake state of a single connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Authenticated(UserId),
    Rejected,
}

impl ConnectionState {
    /// Apply a successful verification.
    ///
    /// Only `Connecting` moves; every other state is returned unchanged.
    pub fn accept(self, user_id: UserId) -> Self {
        match self {
            Self::Connecting => Self::Authenticated(user_id),
            other => other,
        }
    }

    /// Apply a failed verification.
    ///
    /// Only `Connecting` moves; every other state is returned unchanged.
    pub fn reject(self) -> Self {
        match self {
            Self::Connecting => Self::Rejected,
            other => other,
        }
    }
}

/// Proof that a connection completed the handshake.
///
/// Join and send operations take this type, so they cannot be reached
/// before authentication succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedConnection {
    id: ConnectionId,
    user_id: UserId,
}

impl AuthenticatedConnection {
    /// Admit a connection whose state is `Authenticated`, assigning it a fresh id.
    ///
    /// Returns `None` for any other state.
    pub fn establish(state: ConnectionState) -> Option<Self> {
        match state {
            ConnectionState::Authenticated(user_id) => Some(Self {
                id: ConnectionId::generate(),
                user_id,
            }),
            _ => None,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
