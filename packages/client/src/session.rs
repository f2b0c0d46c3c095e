//! WebSocket client session management.

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use quadchat_server::infrastructure::dto::websocket::{
    ClientEvent, SendMessagePayload, ServerEvent,
};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, protocol::Message},
};

use crate::error::ClientError;

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

/// What a session connects to and where it chats
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Gateway endpoint, e.g. `ws://127.0.0.1:8080/ws`
    pub url: String,
    pub token: String,
    pub conversation_id: String,
}

impl SessionConfig {
    fn handshake_url(&self) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}token={}", self.url, separator, self.token)
    }
}

fn encode(event: &ClientEvent) -> Result<Message, ClientError> {
    let json = serde_json::to_string(event)
        .map_err(|e| ClientError::ConnectionError(format!("Failed to encode frame: {}", e)))?;
    Ok(Message::Text(json.into()))
}

fn handshake_error(error: WsError) -> ClientError {
    match error {
        WsError::Http(response) if response.status().as_u16() == 401 => {
            let reason = response
                .body()
                .as_deref()
                .map(|body| String::from_utf8_lossy(body).into_owned())
                .filter(|body| !body.is_empty())
                .unwrap_or_else(|| "token rejected".to_string());
            ClientError::Unauthorized(reason)
        }
        e => ClientError::ConnectionError(e.to_string()),
    }
}

/// Run one WebSocket client session
///
/// Returns `Ok` when the user ends the session, an error when the gateway
/// rejects the token or the connection drops.
pub async fn run_client_session(config: &SessionConfig) -> Result<(), ClientError> {
    let (ws_stream, _) = connect_async(config.handshake_url())
        .await
        .map_err(handshake_error)?;

    tracing::info!("Connected to conversation gateway");

    let (mut write, mut read) = ws_stream.split();

    write
        .send(encode(&ClientEvent::JoinConversation(
            config.conversation_id.clone(),
        ))?)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    print!("{}", MessageFormatter::format_joined(&config.conversation_id));

    let prompt_label = config.conversation_id.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let formatted = match serde_json::from_str::<ServerEvent>(text.as_str()) {
                        Ok(ServerEvent::ReceiveMessage(message)) => {
                            MessageFormatter::format_received(&message)
                        }
                        Err(_) => MessageFormatter::format_raw_message(text.as_str()),
                    };
                    print!("{}", formatted);
                    redisplay_prompt(&prompt_label);
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt(&prompt_label);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    return true;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return true;
                }
                _ => {}
            }
        }
        true
    });

    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // rustyline is synchronous, so it gets its own thread
    let prompt = format!("{}> ", config.conversation_id);
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    let conversation_id = config.conversation_id.clone();
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let frame = match encode(&ClientEvent::SendMessage(SendMessagePayload {
                conversation_id: conversation_id.clone(),
                text: line,
            })) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("{}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(frame).await {
                tracing::warn!("Failed to send message: {}", e);
                return true;
            }

            // No acknowledgement comes back; this only confirms the frame left.
            print!(
                "{}",
                MessageFormatter::format_sent_confirmation(&Utc::now())
            );
            redisplay_prompt(&conversation_id);
        }
        let _ = write.close().await;
        false
    });

    // If any one of the tasks completes, abort the other
    let connection_lost = tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            read_result.unwrap_or(true)
        }
        write_result = &mut write_task => {
            read_task.abort();
            write_result.unwrap_or(true)
        }
    };

    if connection_lost {
        return Err(ClientError::ConnectionError("Connection lost".to_string()));
    }
    Ok(())
}
