//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{
    AuthenticateConnectionUseCase, DisconnectConnectionUseCase, InspectConversationsUseCase,
    JoinConversationUseCase, RelayMessageUseCase,
};

use super::{
    handler::{
        http::{conversation_members, health_check, list_conversations},
        websocket::websocket_handler,
    },
    origin::AllowedOrigins,
    signal::shutdown_signal,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Conversation gateway server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     authenticate_connection_usecase,
///     join_conversation_usecase,
///     relay_message_usecase,
///     disconnect_connection_usecase,
///     inspect_conversations_usecase,
///     allowed_origins,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(
        authenticate_connection_usecase: Arc<AuthenticateConnectionUseCase>,
        join_conversation_usecase: Arc<JoinConversationUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
        inspect_conversations_usecase: Arc<InspectConversationsUseCase>,
        allowed_origins: AllowedOrigins,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                authenticate_connection_usecase,
                join_conversation_usecase,
                relay_message_usecase,
                disconnect_connection_usecase,
                inspect_conversations_usecase,
                allowed_origins,
            }),
        }
    }

    /// Build the router (shared between production startup and tests)
    pub fn router(&self) -> Router {
        let cors = self.state.allowed_origins.cors_layer();

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/conversations", get(list_conversations))
            .route(
                "/api/conversations/{conversation_id}/members",
                get(conversation_members),
            )
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already-bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    /// Run the gateway until Ctrl+C / SIGTERM
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    pub async fn run(self, host: String, port: u16) -> Result<(), ServerError> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        tracing::info!(
            "Conversation gateway listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws?token=<jwt>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
