//! Test harness: a gateway on an ephemeral port plus a small WebSocket client.

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use quadchat_server::{
    domain::{MessageStore, NewMessage, PersistedMessage, StorageError, UserId},
    infrastructure::{
        auth::JwtTokenVerifier,
        dto::{
            http::{ConversationSummaryDto, MemberDto},
            websocket::{ClientEvent, SendMessagePayload, ServerEvent},
        },
        membership::RoomRegistry,
        store::InMemoryMessageStore,
    },
    ui::{AllowedOrigins, Server},
    usecase::{
        AuthenticateConnectionUseCase, DisconnectConnectionUseCase, InspectConversationsUseCase,
        JoinConversationUseCase, RelayMessageUseCase,
    },
};
use quadchat_shared::time::SystemClock;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

pub const SECRET: &str = "integration-secret";
pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Message Store that can be switched into a failing mode
pub struct ToggleStore {
    inner: InMemoryMessageStore,
    failing: AtomicBool,
}

impl ToggleStore {
    fn new() -> Self {
        Self {
            inner: InMemoryMessageStore::new(Arc::new(SystemClock)),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn stored_count(&self) -> usize {
        self.inner.len().await
    }
}

#[async_trait]
impl MessageStore for ToggleStore {
    async fn create(&self, message: NewMessage) -> Result<PersistedMessage, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("database is down".to_string()));
        }
        self.inner.create(message).await
    }
}

pub struct TestGateway {
    pub addr: SocketAddr,
    pub store: Arc<ToggleStore>,
    verifier: JwtTokenVerifier,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestGateway {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().unwrap();

        let store = Arc::new(ToggleStore::new());
        let membership = Arc::new(RoomRegistry::spawn());
        let server = Server::new(
            Arc::new(AuthenticateConnectionUseCase::new(
                Arc::new(JwtTokenVerifier::new(SECRET, Arc::new(SystemClock))),
                membership.clone(),
            )),
            Arc::new(JoinConversationUseCase::new(membership.clone())),
            Arc::new(RelayMessageUseCase::new(store.clone(), membership.clone())),
            Arc::new(DisconnectConnectionUseCase::new(membership.clone())),
            Arc::new(InspectConversationsUseCase::new(membership)),
            AllowedOrigins::parse(&[ALLOWED_ORIGIN]).unwrap(),
        );

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(server.serve(listener, async {
            let _ = shutdown_rx.await;
        }));

        Self {
            addr,
            store,
            verifier: JwtTokenVerifier::new(SECRET, Arc::new(SystemClock)),
            shutdown: Some(shutdown),
        }
    }

    pub fn token_for(&self, user_id: &str) -> String {
        self.verifier
            .issue_token(&UserId::new(user_id.to_string()).unwrap(), None)
            .unwrap()
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn connect(&self, user_id: &str) -> TestClient {
        let url = format!("{}?token={}", self.ws_url(), self.token_for(user_id));
        let (stream, _) = connect_async(&url)
            .await
            .expect("Failed to open WebSocket connection");
        TestClient { stream }
    }

    pub async fn conversations(&self) -> Vec<ConversationSummaryDto> {
        reqwest::get(self.http_url("/api/conversations"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    pub async fn members(&self, conversation_id: &str) -> Vec<MemberDto> {
        reqwest::get(self.http_url(&format!(
            "/api/conversations/{}/members",
            conversation_id
        )))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
    }

    /// Poll until the conversation has exactly `count` members
    pub async fn wait_for_members(&self, conversation_id: &str, count: usize) {
        for _ in 0..100 {
            if self.members(conversation_id).await.len() == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "conversation '{}' never reached {} member(s)",
            conversation_id, count
        );
    }

    /// Poll until `conversation_id` shows up in the conversation list
    pub async fn wait_for_conversation(&self, conversation_id: &str) {
        for _ in 0..100 {
            if self
                .conversations()
                .await
                .iter()
                .any(|conversation| conversation.id == conversation_id)
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("conversation '{}' never appeared", conversation_id);
    }

    /// Poll until the store holds `count` messages
    pub async fn wait_for_stored(&self, count: usize) {
        for _ in 0..100 {
            if self.store.stored_count().await == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("store never reached {} message(s)", count);
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn send_event(&mut self, event: &ClientEvent) {
        let json = serde_json::to_string(event).unwrap();
        self.send_raw(&json).await;
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::Text(text.to_string().into()))
            .await
            .expect("Failed to send frame");
    }

    pub async fn join(&mut self, conversation_id: &str) {
        self.send_event(&ClientEvent::JoinConversation(conversation_id.to_string()))
            .await;
    }

    pub async fn send_message(&mut self, conversation_id: &str, text: &str) {
        self.send_event(&ClientEvent::SendMessage(SendMessagePayload {
            conversation_id: conversation_id.to_string(),
            text: text.to_string(),
        }))
        .await;
    }

    /// Next server event, or `None` if nothing arrives within `wait`
    pub async fn next_event(&mut self, wait: Duration) -> Option<ServerEvent> {
        loop {
            let frame = tokio::time::timeout(wait, self.stream.next()).await.ok()??;
            match frame {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(text.as_str()).expect("Unexpected frame"));
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => continue,
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
