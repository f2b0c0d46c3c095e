//! Token Verifier trait.

use async_trait::async_trait;

use super::{error::AuthenticationError, value_object::UserId};

/// Validates an opaque bearer token and yields the user it was issued to.
///
/// Implementations hold whatever shared secret they need.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserId, AuthenticationError>;
}
