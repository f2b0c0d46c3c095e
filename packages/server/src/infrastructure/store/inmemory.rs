//! In-memory Message Store.
//!
//! Keeps every persisted message in process memory. Stands in for the
//! relational store so the gateway can run on its own.

use std::sync::Arc;

use async_trait::async_trait;
use quadchat_shared::time::Clock;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{MessageStore, NewMessage, PersistedMessage, SenderSummary, StorageError};

use super::user_directory::UserDirectory;

pub struct InMemoryMessageStore {
    messages: Mutex<Vec<PersistedMessage>>,
    /// When set, senders must be listed here (referential integrity)
    directory: Option<UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageStore {
    /// Create a store that accepts any sender and uses the sender id as its name
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            directory: None,
            clock,
        }
    }

    /// Require senders to exist in `directory` and take their names from it
    pub fn with_directory(mut self, directory: UserDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }

    /// All stored messages in insertion order
    pub async fn messages(&self) -> Vec<PersistedMessage> {
        self.messages.lock().await.clone()
    }

    fn sender_name(&self, message: &NewMessage) -> Result<String, StorageError> {
        match &self.directory {
            None => Ok(message.sender_id.as_str().to_string()),
            Some(directory) => directory
                .name_of(&message.sender_id)
                .map(str::to_string)
                .ok_or_else(|| {
                    StorageError::ConstraintViolation(format!(
                        "unknown sender '{}'",
                        message.sender_id
                    ))
                }),
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create(&self, message: NewMessage) -> Result<PersistedMessage, StorageError> {
        let name = self.sender_name(&message)?;

        let persisted = PersistedMessage {
            id: Uuid::new_v4().to_string(),
            text: message.text.into_string(),
            sender: SenderSummary {
                id: message.sender_id.clone(),
                name,
            },
            sender_id: message.sender_id,
            conversation_id: message.conversation_id,
            created_at: self.clock.now(),
        };

        self.messages.lock().await.push(persisted.clone());
        tracing::debug!(
            "Stored message '{}' in conversation '{}'",
            persisted.id,
            persisted.conversation_id
        );

        Ok(persisted)
    }
}
