//! Message Store implementations.

pub mod inmemory;
pub mod user_directory;

pub use inmemory::InMemoryMessageStore;
pub use user_directory::{UserDirectory, UserDirectoryError};
