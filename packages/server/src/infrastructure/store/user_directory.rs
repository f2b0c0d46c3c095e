//! Sender name lookup for the in-memory store.
//!
//! Loaded from a JSON array of `{"id": "...", "name": "..."}` objects.

use std::{collections::HashMap, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{UserId, ValueObjectError};

#[derive(Debug, Error)]
pub enum UserDirectoryError {
    #[error("failed to read user directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse user directory: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid user entry: {0}")]
    InvalidEntry(#[from] ValueObjectError),
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    id: String,
    name: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    names: HashMap<UserId, String>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: UserId, name: impl Into<String>) -> Self {
        self.names.insert(user_id, name.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self, UserDirectoryError> {
        let entries: Vec<UserEntry> = serde_json::from_str(json)?;
        let mut directory = Self::new();
        for entry in entries {
            directory = directory.with_user(UserId::new(entry.id)?, entry.name);
        }
        Ok(directory)
    }

    pub fn load(path: &Path) -> Result<Self, UserDirectoryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn name_of(&self, user_id: &UserId) -> Option<&str> {
        self.names.get(user_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
