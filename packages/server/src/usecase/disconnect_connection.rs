//! UseCase: 切断処理
//!
//! 切断された接続を全ルームから削除する。残りの参加者への退出通知は行わない。

use std::sync::Arc;

use crate::domain::{AuthenticatedConnection, ConversationId, MembershipError, RoomMembership};

pub struct DisconnectConnectionUseCase {
    membership: Arc<dyn RoomMembership>,
}

impl DisconnectConnectionUseCase {
    pub fn new(membership: Arc<dyn RoomMembership>) -> Self {
        Self { membership }
    }

    /// Purge the connection from every room.
    ///
    /// # Returns
    ///
    /// The rooms the connection was removed from (empty if it never joined any).
    pub async fn execute(
        &self,
        connection: &AuthenticatedConnection,
    ) -> Result<Vec<ConversationId>, MembershipError> {
        let left = self.membership.unregister(connection.id()).await?;

        tracing::info!(
            "User '{}' ({}) disconnected, removed from {} conversation(s)",
            connection.user_id(),
            connection.id(),
            left.len()
        );

        Ok(left)
    }
}
