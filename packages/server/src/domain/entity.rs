//! Domain entities.

use chrono::{DateTime, Utc};

use super::value_object::{ConnectionId, ConversationId, MessageText, UserId};

/// Candidate chat message handed to the Message Store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub text: MessageText,
    pub sender_id: UserId,
    pub conversation_id: ConversationId,
}

/// Denormalized sender details attached by the Message Store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderSummary {
    pub id: UserId,
    pub name: String,
}

/// Chat message as returned by the Message Store, with generated fields filled in.
///
/// This exact record is what room peers receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMessage {
    pub id: String,
    pub text: String,
    pub sender_id: UserId,
    pub conversation_id: ConversationId,
    pub created_at: DateTime<Utc>,
    pub sender: SenderSummary,
}

/// Events pushed from the gateway to a single connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    ReceiveMessage(PersistedMessage),
}

/// A connection currently joined to a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
}

/// Point-in-time view of one non-empty room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub conversation_id: ConversationId,
    pub member_count: usize,
}
