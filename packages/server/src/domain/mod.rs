//! Domain layer: value objects, entities, errors and the collaborator traits
//! the gateway depends on.

pub mod connection;
pub mod entity;
pub mod error;
pub mod membership;
pub mod message_store;
pub mod token_verifier;
pub mod value_object;

pub use connection::{AuthenticatedConnection, ConnectionState};
pub use entity::{Member, NewMessage, OutboundEvent, PersistedMessage, RoomSummary, SenderSummary};
pub use error::{AuthenticationError, MembershipError, StorageError, ValueObjectError};
pub use membership::{JoinOutcome, PusherChannel, RoomMembership};
pub use message_store::MessageStore;
pub use token_verifier::TokenVerifier;
pub use value_object::{ConnectionId, ConversationId, MessageText, UserId};
