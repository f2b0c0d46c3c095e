//! UseCase: read-only views of the membership table for the HTTP API.

use std::sync::Arc;

use crate::domain::{ConversationId, Member, MembershipError, RoomMembership, RoomSummary};

pub struct InspectConversationsUseCase {
    membership: Arc<dyn RoomMembership>,
}

impl InspectConversationsUseCase {
    pub fn new(membership: Arc<dyn RoomMembership>) -> Self {
        Self { membership }
    }

    /// Every conversation that currently has at least one member
    pub async fn list(&self) -> Result<Vec<RoomSummary>, MembershipError> {
        self.membership.snapshot().await
    }

    /// Members of one conversation (empty for unknown ids)
    pub async fn members(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Member>, MembershipError> {
        self.membership.members(conversation_id).await
    }
}
