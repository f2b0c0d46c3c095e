//! WebSocket event frames.
//!
//! Every frame is a JSON text frame shaped `{"event": <name>, "data": <payload>}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client → server events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// `{"event":"join_conversation","data":"c1"}`
    JoinConversation(String),
    /// `{"event":"send_message","data":{"conversationId":"c1","text":"hi"}}`
    SendMessage(SendMessagePayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub conversation_id: String,
    pub text: String,
}

/// Server → client events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ReceiveMessage(MessageDto),
}

/// Persisted message as delivered to room peers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub text: String,
    pub sender_id: String,
    pub conversation_id: String,
    pub created_at: DateTime<Utc>,
    pub sender: SenderDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderDto {
    pub id: String,
    pub name: String,
}
