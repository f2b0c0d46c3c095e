//! UseCase layer.
//!
//! Each use case takes its collaborators as trait objects at construction,
//! so the whole gateway is wired once per process and handed to every
//! connection handler.

mod authenticate_connection;
mod disconnect_connection;
mod error;
mod inspect_conversations;
mod join_conversation;
mod relay_message;

pub use authenticate_connection::AuthenticateConnectionUseCase;
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use error::RelayError;
pub use inspect_conversations::InspectConversationsUseCase;
pub use join_conversation::JoinConversationUseCase;
pub use relay_message::{RelayMessageUseCase, RelayReport};
