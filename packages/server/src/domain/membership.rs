//! Room membership trait.
//!
//! The membership table is the only shared mutable state of the gateway.
//! Implementations must serialize every read and write against it.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    entity::{Member, OutboundEvent, RoomSummary},
    error::MembershipError,
    value_object::{ConnectionId, ConversationId, UserId},
};

/// Outbound channel of a single connection
pub type PusherChannel = mpsc::UnboundedSender<OutboundEvent>;

/// Result of a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The connection was added to the room
    Joined,
    /// The connection was already a member; nothing changed
    AlreadyMember,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomMembership: Send + Sync {
    /// Register an authenticated connection and its outbound channel
    async fn register(
        &self,
        connection_id: ConnectionId,
        user_id: UserId,
        channel: PusherChannel,
    ) -> Result<(), MembershipError>;

    /// Add a registered connection to a room (idempotent)
    async fn join(
        &self,
        connection_id: ConnectionId,
        conversation_id: ConversationId,
    ) -> Result<JoinOutcome, MembershipError>;

    /// Push an event to every current member of the room except `exclude`.
    ///
    /// Returns the number of connections the event was handed to.
    async fn broadcast(
        &self,
        conversation_id: ConversationId,
        exclude: ConnectionId,
        event: OutboundEvent,
    ) -> Result<usize, MembershipError>;

    /// Drop a connection and remove it from every room it joined.
    ///
    /// Returns the rooms it left. Unknown connections yield an empty list.
    async fn unregister(
        &self,
        connection_id: ConnectionId,
    ) -> Result<Vec<ConversationId>, MembershipError>;

    /// Current members of a room
    async fn members(&self, conversation_id: ConversationId)
    -> Result<Vec<Member>, MembershipError>;

    /// Every non-empty room with its member count
    async fn snapshot(&self) -> Result<Vec<RoomSummary>, MembershipError>;
}
