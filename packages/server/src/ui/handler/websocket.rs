//! WebSocket connection handlers.
//!
//! Every connection is served by two tasks:
//! - the receive loop reads frames one at a time and fully handles each
//!   (including the relay's store call) before reading the next
//! - the pusher loop drains the connection's outbound channel into the socket

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::{AuthenticatedConnection, ConversationId, MessageText, OutboundEvent},
    infrastructure::dto::websocket::{ClientEvent, SendMessagePayload, ServerEvent},
    ui::state::AppState,
    usecase::RelayError,
};

/// Query parameters of the upgrade request
#[derive(Debug, Deserialize)]
pub struct HandshakeQuery {
    pub token: Option<String>,
}

/// Bearer token of the handshake: the `token` query parameter, else the
/// `Authorization: Bearer` header. A blank query parameter counts as absent.
fn handshake_token(query_token: Option<String>, headers: &HeaderMap) -> Option<String> {
    query_token.filter(|token| !token.trim().is_empty()).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                let (scheme, token) = value.trim().split_once(' ')?;
                scheme
                    .eq_ignore_ascii_case("bearer")
                    .then(|| token.trim().to_string())
            })
    })
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<HandshakeQuery>,
    headers: HeaderMap,
) -> Response {
    if let Some(origin) = headers.get(header::ORIGIN)
        && !state.allowed_origins.allows(origin)
    {
        tracing::warn!("Rejected handshake from disallowed origin {:?}", origin);
        return (StatusCode::FORBIDDEN, "Origin not allowed").into_response();
    }

    let token = handshake_token(query.token, &headers);
    let connection = match state
        .authenticate_connection_usecase
        .execute(token.as_deref())
        .await
    {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Rejected handshake: {}", e);
            return (StatusCode::UNAUTHORIZED, e.to_string()).into_response();
        }
    };

    tracing::info!(
        "User '{}' authenticated as connection {}",
        connection.user_id(),
        connection.id()
    );

    ws.on_upgrade(move |socket| handle_socket(socket, state, connection))
}

/// Spawns a task that receives events from the rx channel and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Outbound events addressed to this connection
/// * `sender` - WebSocket sink of this connection
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<OutboundEvent>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&ServerEvent::from(event)) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize outbound event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection: AuthenticatedConnection,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    if let Err(e) = state
        .authenticate_connection_usecase
        .admit(&connection, tx)
        .await
    {
        tracing::error!("Failed to admit connection {}: {}", connection.id(), e);
        return;
    }

    let (sender, receiver) = socket.split();
    let (outbound_closed_tx, outbound_closed_rx) = oneshot::channel::<()>();

    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        state.clone(),
        connection.clone(),
        outbound_closed_rx,
    ));
    let mut send_task = pusher_loop(rx, sender);

    // The receive loop is never aborted: a relay in flight runs to completion.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            let _ = outbound_closed_tx.send(());
            if let Err(e) = recv_task.await {
                tracing::error!("Receive loop of connection {} failed: {}", connection.id(), e);
            }
        }
    };

    if let Err(e) = state
        .disconnect_connection_usecase
        .execute(&connection)
        .await
    {
        tracing::warn!("Failed to purge connection {}: {}", connection.id(), e);
    }
}

async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    connection: AuthenticatedConnection,
    mut outbound_closed: oneshot::Receiver<()>,
) {
    loop {
        let frame = tokio::select! {
            frame = receiver.next() => frame,
            _ = &mut outbound_closed => {
                tracing::debug!("Outbound side of connection {} closed", connection.id());
                break;
            }
        };

        let msg = match frame {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::warn!("WebSocket error on connection {}: {}", connection.id(), e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => handle_text_frame(&state, &connection, text.as_str()).await,
            Message::Ping(_) => {
                // Ping/pong is handled automatically by the WebSocket protocol
                tracing::debug!("Received ping");
            }
            Message::Close(_) => {
                tracing::info!("Connection {} requested close", connection.id());
                break;
            }
            _ => {}
        }
    }
}

async fn handle_text_frame(state: &AppState, connection: &AuthenticatedConnection, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(
                "Ignoring unparseable frame from connection {}: {}",
                connection.id(),
                e
            );
            return;
        }
    };

    match event {
        ClientEvent::JoinConversation(conversation_id) => {
            let Ok(conversation_id) = ConversationId::try_from(conversation_id) else {
                tracing::warn!("Ignoring join with empty conversation id");
                return;
            };
            if let Err(e) = state
                .join_conversation_usecase
                .execute(connection, conversation_id)
                .await
            {
                tracing::warn!("Join failed for connection {}: {}", connection.id(), e);
            }
        }
        ClientEvent::SendMessage(payload) => handle_send_message(state, connection, payload).await,
    }
}

async fn handle_send_message(
    state: &AppState,
    connection: &AuthenticatedConnection,
    payload: SendMessagePayload,
) {
    let conversation_id = match ConversationId::try_from(payload.conversation_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Ignoring message: {}", e);
            return;
        }
    };
    let text = MessageText::from(payload.text);

    // Failures are logged only; the sender gets no acknowledgement either way.
    match state
        .relay_message_usecase
        .execute(connection, conversation_id, text)
        .await
    {
        Ok(report) => tracing::debug!(
            "Message '{}' delivered to {} peer(s)",
            report.message_id,
            report.delivered
        ),
        Err(RelayError::Storage(e)) => tracing::error!(
            "Dropped message from '{}': {}",
            connection.user_id(),
            e
        ),
        Err(e) => tracing::error!("Relay failed for '{}': {}", connection.user_id(), e),
    }
}
