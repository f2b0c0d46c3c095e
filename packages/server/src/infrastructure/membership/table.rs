//! In-memory membership table.
//!
//! Maps each room to the connections currently in it, and each connection to
//! the rooms it joined so that a disconnect can purge it in one step.
//! The table is not synchronized; `RoomRegistry` owns it exclusively.

use std::collections::{HashMap, HashSet};

use crate::domain::{
    ConnectionId, ConversationId, JoinOutcome, Member, MembershipError, OutboundEvent,
    PusherChannel, RoomSummary, UserId,
};

struct ConnectionEntry {
    user_id: UserId,
    channel: PusherChannel,
    rooms: HashSet<ConversationId>,
}

#[derive(Default)]
pub struct RoomTable {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<ConversationId, HashSet<ConnectionId>>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. Registering an id twice replaces its channel
    /// and keeps its rooms.
    pub fn register(
        &mut self,
        connection_id: ConnectionId,
        user_id: UserId,
        channel: PusherChannel,
    ) {
        match self.connections.get_mut(&connection_id) {
            Some(entry) => {
                tracing::warn!(
                    "Connection '{}' registered twice, replacing its channel",
                    connection_id
                );
                entry.channel = channel;
            }
            None => {
                self.connections.insert(
                    connection_id,
                    ConnectionEntry {
                        user_id,
                        channel,
                        rooms: HashSet::new(),
                    },
                );
            }
        }
    }

    pub fn join(
        &mut self,
        connection_id: ConnectionId,
        conversation_id: ConversationId,
    ) -> Result<JoinOutcome, MembershipError> {
        let entry = self
            .connections
            .get_mut(&connection_id)
            .ok_or_else(|| MembershipError::UnknownConnection(connection_id.to_string()))?;

        if !entry.rooms.insert(conversation_id.clone()) {
            return Ok(JoinOutcome::AlreadyMember);
        }
        self.rooms
            .entry(conversation_id)
            .or_default()
            .insert(connection_id);

        Ok(JoinOutcome::Joined)
    }

    /// Hand `event` to every member of the room except `exclude`.
    ///
    /// Members whose outbound channel is already closed are skipped.
    pub fn broadcast(
        &self,
        conversation_id: &ConversationId,
        exclude: ConnectionId,
        event: &OutboundEvent,
    ) -> usize {
        let Some(member_ids) = self.rooms.get(conversation_id) else {
            return 0;
        };

        let mut delivered = 0;
        for member_id in member_ids.iter().filter(|id| **id != exclude) {
            let Some(entry) = self.connections.get(member_id) else {
                continue;
            };
            if let Err(e) = entry.channel.send(event.clone()) {
                tracing::warn!("Failed to push event to connection '{}': {}", member_id, e);
            } else {
                delivered += 1;
            }
        }
        delivered
    }

    /// Remove a connection from every room and forget it.
    ///
    /// Rooms left empty are dropped so the id can later be reused from scratch.
    pub fn unregister(&mut self, connection_id: ConnectionId) -> Vec<ConversationId> {
        let Some(entry) = self.connections.remove(&connection_id) else {
            return Vec::new();
        };

        let mut left: Vec<ConversationId> = entry.rooms.into_iter().collect();
        for conversation_id in &left {
            if let Some(members) = self.rooms.get_mut(conversation_id) {
                members.remove(&connection_id);
                if members.is_empty() {
                    self.rooms.remove(conversation_id);
                }
            }
        }
        left.sort();
        left
    }

    /// Members of a room, ordered by user id then connection id
    pub fn members(&self, conversation_id: &ConversationId) -> Vec<Member> {
        let mut members: Vec<Member> = self
            .rooms
            .get(conversation_id)
            .into_iter()
            .flatten()
            .filter_map(|connection_id| {
                self.connections.get(connection_id).map(|entry| Member {
                    connection_id: *connection_id,
                    user_id: entry.user_id.clone(),
                })
            })
            .collect();

        members.sort_by(|a, b| {
            a.user_id
                .cmp(&b.user_id)
                .then(a.connection_id.cmp(&b.connection_id))
        });
        members
    }

    /// Non-empty rooms ordered by id
    pub fn snapshot(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<RoomSummary> = self
            .rooms
            .iter()
            .map(|(conversation_id, members)| RoomSummary {
                conversation_id: conversation_id.clone(),
                member_count: members.len(),
            })
            .collect();
        rooms.sort_by(|a, b| a.conversation_id.cmp(&b.conversation_id));
        rooms
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tokio::sync::mpsc;

    use crate::domain::{PersistedMessage, SenderSummary};

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn room(id: &str) -> ConversationId {
        ConversationId::new(id.to_string()).unwrap()
    }

    fn event(text: &str) -> OutboundEvent {
        OutboundEvent::ReceiveMessage(PersistedMessage {
            id: "m1".to_string(),
            text: text.to_string(),
            sender_id: user("u1"),
            conversation_id: room("c1"),
            created_at: Utc.timestamp_opt(1_711_962_000, 0).unwrap(),
            sender: SenderSummary {
                id: user("u1"),
                name: "u1".to_string(),
            },
        })
    }

    fn registered(
        table: &mut RoomTable,
        user_id: &str,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<OutboundEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        table.register(connection_id, user(user_id), tx);
        (connection_id, rx)
    }

    #[test]
    fn test_join_twice_yields_single_membership() {
        // テスト項目: 同じ接続が同じルームに 2 回参加しても参加者は 1 件
        // given (前提条件):
        let mut table = RoomTable::new();
        let (conn, _rx) = registered(&mut table, "u1");

        // when (操作):
        let first = table.join(conn, room("c1")).unwrap();
        let second = table.join(conn, room("c1")).unwrap();

        // then (期待する結果):
        assert_eq!(first, JoinOutcome::Joined);
        assert_eq!(second, JoinOutcome::AlreadyMember);
        assert_eq!(table.members(&room("c1")).len(), 1);
    }

    #[test]
    fn test_join_unknown_connection_fails() {
        // テスト項目: 未登録の接続は参加できない
        // given (前提条件):
        let mut table = RoomTable::new();
        let conn = ConnectionId::generate();

        // when (操作):
        let result = table.join(conn, room("c1"));

        // then (期待する結果):
        assert!(matches!(result, Err(MembershipError::UnknownConnection(_))));
        assert!(table.snapshot().is_empty());
    }

    #[test]
    fn test_broadcast_excludes_sender() {
        // テスト項目: ブロードキャストは送信者自身を除外する
        // given (前提条件):
        let mut table = RoomTable::new();
        let (alice, mut alice_rx) = registered(&mut table, "alice");
        let (bob, mut bob_rx) = registered(&mut table, "bob");
        table.join(alice, room("c1")).unwrap();
        table.join(bob, room("c1")).unwrap();

        // when (操作):
        let delivered = table.broadcast(&room("c1"), alice, &event("hi"));

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert_eq!(bob_rx.try_recv().unwrap(), event("hi"));
        assert!(alice_rx.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_only_reaches_the_target_room() {
        // テスト項目: 別ルームの参加者には配信されない
        // given (前提条件):
        let mut table = RoomTable::new();
        let (alice, _alice_rx) = registered(&mut table, "alice");
        let (bob, mut bob_rx) = registered(&mut table, "bob");
        table.join(alice, room("c1")).unwrap();
        table.join(bob, room("c2")).unwrap();

        // when (操作):
        let delivered = table.broadcast(&room("c1"), alice, &event("hi"));

        // then (期待する結果):
        assert_eq!(delivered, 0);
        assert!(bob_rx.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_to_unknown_room_is_noop() {
        // テスト項目: 誰も参加していないルームへのブロードキャストは何もしない
        // given (前提条件):
        let table = RoomTable::new();

        // when (操作):
        let delivered = table.broadcast(&room("ghost"), ConnectionId::generate(), &event("hi"));

        // then (期待する結果):
        assert_eq!(delivered, 0);
    }

    #[test]
    fn test_broadcast_skips_closed_channels() {
        // テスト項目: 受信側が閉じた接続はスキップされ、他の参加者には届く
        // given (前提条件):
        let mut table = RoomTable::new();
        let (alice, _alice_rx) = registered(&mut table, "alice");
        let (bob, bob_rx) = registered(&mut table, "bob");
        let (carol, mut carol_rx) = registered(&mut table, "carol");
        for conn in [alice, bob, carol] {
            table.join(conn, room("c1")).unwrap();
        }
        drop(bob_rx);

        // when (操作):
        let delivered = table.broadcast(&room("c1"), alice, &event("hi"));

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert_eq!(carol_rx.try_recv().unwrap(), event("hi"));
    }

    #[test]
    fn test_unregister_purges_every_room() {
        // テスト項目: 切断すると参加していた全ルームから削除される
        // given (前提条件):
        let mut table = RoomTable::new();
        let (alice, _alice_rx) = registered(&mut table, "alice");
        let (bob, mut bob_rx) = registered(&mut table, "bob");
        table.join(alice, room("c1")).unwrap();
        table.join(alice, room("c2")).unwrap();
        table.join(bob, room("c1")).unwrap();

        // when (操作):
        let left = table.unregister(bob);

        // then (期待する結果):
        assert_eq!(left, vec![room("c1")]);
        assert_eq!(table.members(&room("c1")).len(), 1);
        assert_eq!(table.connection_count(), 1);
        assert_eq!(table.broadcast(&room("c1"), alice, &event("hi")), 0);
        assert!(bob_rx.try_recv().is_err());
    }

    #[test]
    fn test_unregister_drops_empty_rooms() {
        // テスト項目: 最後の参加者が抜けたルームはスナップショットから消え、再参加できる
        // given (前提条件):
        let mut table = RoomTable::new();
        let (alice, _alice_rx) = registered(&mut table, "alice");
        table.join(alice, room("c1")).unwrap();

        // when (操作):
        let left = table.unregister(alice);

        // then (期待する結果):
        assert_eq!(left, vec![room("c1")]);
        assert!(table.snapshot().is_empty());

        let (bob, _bob_rx) = registered(&mut table, "bob");
        assert_eq!(table.join(bob, room("c1")).unwrap(), JoinOutcome::Joined);
        assert_eq!(table.members(&room("c1")).len(), 1);
    }

    #[test]
    fn test_unregister_unknown_connection_is_noop() {
        // テスト項目: 未登録の接続を切断してもエラーにならない（冪等性）
        // given (前提条件):
        let mut table = RoomTable::new();

        // when (操作):
        let left = table.unregister(ConnectionId::generate());

        // then (期待する結果):
        assert!(left.is_empty());
    }

    #[test]
    fn test_same_user_on_two_connections_counts_twice() {
        // テスト項目: 同一ユーザーの複数接続はそれぞれ別の参加者として扱われる
        // given (前提条件):
        let mut table = RoomTable::new();
        let (first, _rx1) = registered(&mut table, "u1");
        let (second, mut rx2) = registered(&mut table, "u1");
        table.join(first, room("c1")).unwrap();
        table.join(second, room("c1")).unwrap();

        // when (操作):
        let delivered = table.broadcast(&room("c1"), first, &event("hi"));

        // then (期待する結果):
        assert_eq!(table.members(&room("c1")).len(), 2);
        assert_eq!(delivered, 1);
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_snapshot_is_sorted_by_room() {
        // テスト項目: スナップショットはルーム ID 順に並ぶ
        // given (前提条件):
        let mut table = RoomTable::new();
        let (alice, _rx) = registered(&mut table, "alice");
        let (bob, _rx2) = registered(&mut table, "bob");
        table.join(alice, room("zeta")).unwrap();
        table.join(alice, room("alpha")).unwrap();
        table.join(bob, room("alpha")).unwrap();

        // when (操作):
        let snapshot = table.snapshot();

        // then (期待する結果):
        assert_eq!(
            snapshot,
            vec![
                RoomSummary {
                    conversation_id: room("alpha"),
                    member_count: 2,
                },
                RoomSummary {
                    conversation_id: room("zeta"),
                    member_count: 1,
                },
            ]
        );
    }
}
