//! Shared application state.
//!
//! Built once per process and handed to every handler. It carries the use
//! cases (and through them the injected Token Verifier, Message Store and
//! room registry); there is no other process-wide state.

use std::sync::Arc;

use crate::usecase::{
    AuthenticateConnectionUseCase, DisconnectConnectionUseCase, InspectConversationsUseCase,
    JoinConversationUseCase, RelayMessageUseCase,
};

use super::origin::AllowedOrigins;

pub struct AppState {
    pub authenticate_connection_usecase: Arc<AuthenticateConnectionUseCase>,
    pub join_conversation_usecase: Arc<JoinConversationUseCase>,
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    pub disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
    pub inspect_conversations_usecase: Arc<InspectConversationsUseCase>,
    /// Origins allowed to open a gateway connection
    pub allowed_origins: AllowedOrigins,
}
