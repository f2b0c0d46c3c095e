//! UseCase: メッセージ中継処理（保存してからブロードキャスト）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 保存に成功したメッセージだけが配信されることを保証する
//! - 送信者自身には配信されないことを確認する
//! - 配信先は保存完了時点の参加者であることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者への配信
//! - 異常系：保存失敗（配信なし、接続は継続）
//! - エッジケース：保存待ちの間の参加、複数送信者の完了順序

use std::sync::Arc;

use quadchat_shared::time::to_rfc3339_millis;

use crate::domain::{
    AuthenticatedConnection, ConversationId, MessageStore, MessageText, NewMessage,
    OutboundEvent, RoomMembership,
};

use super::error::RelayError;

/// Outcome of a successful relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReport {
    /// Id generated by the Message Store
    pub message_id: String,
    /// Number of peers the message was handed to
    pub delivered: usize,
}

/// Message Relay
pub struct RelayMessageUseCase {
    message_store: Arc<dyn MessageStore>,
    membership: Arc<dyn RoomMembership>,
}

impl RelayMessageUseCase {
    pub fn new(
        message_store: Arc<dyn MessageStore>,
        membership: Arc<dyn RoomMembership>,
    ) -> Self {
        Self {
            message_store,
            membership,
        }
    }

    /// Persist a chat message, then push the stored record to the room.
    ///
    /// The sender does not have to be a member of the room. Recipients are the
    /// room's members at the moment persistence completes, minus the sender's
    /// own connection. Nothing is broadcast when persistence fails, and no
    /// retry is attempted.
    pub async fn execute(
        &self,
        connection: &AuthenticatedConnection,
        conversation_id: ConversationId,
        text: MessageText,
    ) -> Result<RelayReport, RelayError> {
        let candidate = NewMessage {
            text,
            sender_id: connection.user_id().clone(),
            conversation_id: conversation_id.clone(),
        };

        let persisted = self.message_store.create(candidate).await?;
        let message_id = persisted.id.clone();
        let stored_at = to_rfc3339_millis(&persisted.created_at);

        let delivered = self
            .membership
            .broadcast(
                conversation_id.clone(),
                connection.id(),
                OutboundEvent::ReceiveMessage(persisted),
            )
            .await?;

        tracing::info!(
            "Relayed message '{}' (stored {}) from '{}' to {} peer(s) in conversation '{}'",
            message_id,
            stored_at,
            connection.user_id(),
            delivered,
            conversation_id
        );

        Ok(RelayReport {
            message_id,
            delivered,
        })
    }
}
