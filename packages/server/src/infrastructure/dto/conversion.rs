//! Conversion logic between DTOs and domain entities.

use crate::domain::{Member, OutboundEvent, PersistedMessage, RoomSummary};
use crate::infrastructure::dto::{http, websocket};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<PersistedMessage> for websocket::MessageDto {
    fn from(model: PersistedMessage) -> Self {
        Self {
            id: model.id,
            text: model.text,
            sender_id: model.sender_id.into_string(),
            conversation_id: model.conversation_id.into_string(),
            created_at: model.created_at,
            sender: websocket::SenderDto {
                id: model.sender.id.into_string(),
                name: model.sender.name,
            },
        }
    }
}

impl From<OutboundEvent> for websocket::ServerEvent {
    fn from(event: OutboundEvent) -> Self {
        match event {
            OutboundEvent::ReceiveMessage(message) => Self::ReceiveMessage(message.into()),
        }
    }
}

impl From<RoomSummary> for http::ConversationSummaryDto {
    fn from(model: RoomSummary) -> Self {
        Self {
            id: model.conversation_id.into_string(),
            member_count: model.member_count,
        }
    }
}

impl From<Member> for http::MemberDto {
    fn from(model: Member) -> Self {
        Self {
            connection_id: model.connection_id.to_string(),
            user_id: model.user_id.into_string(),
        }
    }
}
