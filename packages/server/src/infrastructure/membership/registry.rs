//! Single-writer room registry.
//!
//! A dedicated task owns the `RoomTable`; callers talk to it through
//! `RoomRegistry`, a cloneable handle that sends commands over an unbounded
//! channel and waits for the reply on a oneshot. Commands are applied one at a
//! time in arrival order, so a broadcast sees exactly the membership that
//! exists when its command is processed.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{
    ConnectionId, ConversationId, JoinOutcome, Member, MembershipError, OutboundEvent,
    PusherChannel, RoomMembership, RoomSummary, UserId,
};

use super::table::RoomTable;

enum Command {
    Register {
        connection_id: ConnectionId,
        user_id: UserId,
        channel: PusherChannel,
        reply: oneshot::Sender<()>,
    },
    Join {
        connection_id: ConnectionId,
        conversation_id: ConversationId,
        reply: oneshot::Sender<Result<JoinOutcome, MembershipError>>,
    },
    Broadcast {
        conversation_id: ConversationId,
        exclude: ConnectionId,
        event: OutboundEvent,
        reply: oneshot::Sender<usize>,
    },
    Unregister {
        connection_id: ConnectionId,
        reply: oneshot::Sender<Vec<ConversationId>>,
    },
    Members {
        conversation_id: ConversationId,
        reply: oneshot::Sender<Vec<Member>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<RoomSummary>>,
    },
}

/// Handle to the registry task.
///
/// The task exits once every handle has been dropped.
#[derive(Clone)]
pub struct RoomRegistry {
    commands: mpsc::UnboundedSender<Command>,
}

impl RoomRegistry {
    /// Spawn the registry task on the current tokio runtime and return a handle to it
    pub fn spawn() -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_registry(receiver));
        Self { commands }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, MembershipError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .map_err(|_| MembershipError::RegistryClosed)?;
        response.await.map_err(|_| MembershipError::RegistryClosed)
    }
}

async fn run_registry(mut receiver: mpsc::UnboundedReceiver<Command>) {
    let mut table = RoomTable::new();
    tracing::debug!("Room registry started");

    while let Some(command) = receiver.recv().await {
        // A dropped reply receiver only means the caller went away.
        match command {
            Command::Register {
                connection_id,
                user_id,
                channel,
                reply,
            } => {
                table.register(connection_id, user_id, channel);
                let _ = reply.send(());
            }
            Command::Join {
                connection_id,
                conversation_id,
                reply,
            } => {
                let _ = reply.send(table.join(connection_id, conversation_id));
            }
            Command::Broadcast {
                conversation_id,
                exclude,
                event,
                reply,
            } => {
                let _ = reply.send(table.broadcast(&conversation_id, exclude, &event));
            }
            Command::Unregister {
                connection_id,
                reply,
            } => {
                let _ = reply.send(table.unregister(connection_id));
            }
            Command::Members {
                conversation_id,
                reply,
            } => {
                let _ = reply.send(table.members(&conversation_id));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(table.snapshot());
            }
        }
    }

    tracing::debug!(
        "Room registry stopped with {} connection(s) still registered",
        table.connection_count()
    );
}

#[async_trait]
impl RoomMembership for RoomRegistry {
    async fn register(
        &self,
        connection_id: ConnectionId,
        user_id: UserId,
        channel: PusherChannel,
    ) -> Result<(), MembershipError> {
        self.request(|reply| Command::Register {
            connection_id,
            user_id,
            channel,
            reply,
        })
        .await
    }

    async fn join(
        &self,
        connection_id: ConnectionId,
        conversation_id: ConversationId,
    ) -> Result<JoinOutcome, MembershipError> {
        self.request(|reply| Command::Join {
            connection_id,
            conversation_id,
            reply,
        })
        .await?
    }

    async fn broadcast(
        &self,
        conversation_id: ConversationId,
        exclude: ConnectionId,
        event: OutboundEvent,
    ) -> Result<usize, MembershipError> {
        self.request(|reply| Command::Broadcast {
            conversation_id,
            exclude,
            event,
            reply,
        })
        .await
    }

    async fn unregister(
        &self,
        connection_id: ConnectionId,
    ) -> Result<Vec<ConversationId>, MembershipError> {
        self.request(|reply| Command::Unregister {
            connection_id,
            reply,
        })
        .await
    }

    async fn members(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Member>, MembershipError> {
        self.request(|reply| Command::Members {
            conversation_id,
            reply,
        })
        .await
    }

    async fn snapshot(&self) -> Result<Vec<RoomSummary>, MembershipError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }
}
