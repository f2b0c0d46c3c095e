//! UseCase: 会話ルームへの参加

use std::sync::Arc;

use crate::domain::{
    AuthenticatedConnection, ConversationId, JoinOutcome, MembershipError, RoomMembership,
};

pub struct JoinConversationUseCase {
    membership: Arc<dyn RoomMembership>,
}

impl JoinConversationUseCase {
    pub fn new(membership: Arc<dyn RoomMembership>) -> Self {
        Self { membership }
    }

    /// Add the connection to the room. Repeated joins are no-ops.
    pub async fn execute(
        &self,
        connection: &AuthenticatedConnection,
        conversation_id: ConversationId,
    ) -> Result<JoinOutcome, MembershipError> {
        let outcome = self
            .membership
            .join(connection.id(), conversation_id.clone())
            .await?;

        match outcome {
            JoinOutcome::Joined => tracing::info!(
                "User '{}' ({}) joined conversation '{}'",
                connection.user_id(),
                connection.id(),
                conversation_id
            ),
            JoinOutcome::AlreadyMember => tracing::debug!(
                "User '{}' ({}) is already in conversation '{}'",
                connection.user_id(),
                connection.id(),
                conversation_id
            ),
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::{
        domain::{ConnectionState, UserId},
        infrastructure::membership::RoomRegistry,
    };

    fn connection(user_id: &str) -> AuthenticatedConnection {
        let state = ConnectionState::Connecting.accept(UserId::new(user_id.to_string()).unwrap());
        AuthenticatedConnection::establish(state).unwrap()
    }

    fn room(id: &str) -> ConversationId {
        ConversationId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_join_twice_keeps_one_membership() {
        // テスト項目: 同じルームに 2 回参加しても参加者は 1 件のまま
        // given (前提条件):
        let registry = Arc::new(RoomRegistry::spawn());
        let usecase = JoinConversationUseCase::new(registry.clone());
        let u1 = connection("u1");
        let (tx, _rx) = mpsc::unbounded_channel();
        registry
            .register(u1.id(), u1.user_id().clone(), tx)
            .await
            .unwrap();

        // when (操作):
        let first = usecase.execute(&u1, room("c1")).await.unwrap();
        let second = usecase.execute(&u1, room("c1")).await.unwrap();

        // then (期待する結果):
        assert_eq!(first, JoinOutcome::Joined);
        assert_eq!(second, JoinOutcome::AlreadyMember);
        assert_eq!(registry.members(room("c1")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_join_without_admission_fails() {
        // テスト項目: レジストリ未登録の接続は参加できない
        // given (前提条件):
        let registry = Arc::new(RoomRegistry::spawn());
        let usecase = JoinConversationUseCase::new(registry.clone());

        // when (操作):
        let result = usecase.execute(&connection("u1"), room("c1")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(MembershipError::UnknownConnection(_))));
    }
}
