//! Message Store trait.

use async_trait::async_trait;

use super::{
    entity::{NewMessage, PersistedMessage},
    error::StorageError,
};

/// Durable storage for chat messages.
///
/// `create` returns the stored record with its generated id, timestamp and
/// sender summary. The gateway never reads messages back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create(&self, message: NewMessage) -> Result<PersistedMessage, StorageError>;
}
