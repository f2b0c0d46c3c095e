//! UseCase: 接続認証処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AuthenticateConnectionUseCase::execute() / admit()
//!
//! ### なぜこのテストが必要か
//! - 認証前の接続が一切のイベントを処理できないことを保証する
//! - トークンなし・不正トークンが正しいエラーで拒否されることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークン
//! - 異常系：トークンなし、空白のみのトークン、不正トークン

use std::sync::Arc;

use crate::domain::{
    AuthenticatedConnection, AuthenticationError, ConnectionState, MembershipError, PusherChannel,
    RoomMembership, TokenVerifier,
};

/// Connection Authenticator
pub struct AuthenticateConnectionUseCase {
    token_verifier: Arc<dyn TokenVerifier>,
    membership: Arc<dyn RoomMembership>,
}

impl AuthenticateConnectionUseCase {
    pub fn new(
        token_verifier: Arc<dyn TokenVerifier>,
        membership: Arc<dyn RoomMembership>,
    ) -> Self {
        Self {
            token_verifier,
            membership,
        }
    }

    /// Run the handshake check.
    ///
    /// # Arguments
    ///
    /// * `token` - Bearer token from the handshake payload, if any
    ///
    /// # Returns
    ///
    /// * `Ok(AuthenticatedConnection)` - the connection may be admitted
    /// * `Err(AuthenticationError)` - terminal rejection, the socket must be closed
    pub async fn execute(
        &self,
        token: Option<&str>,
    ) -> Result<AuthenticatedConnection, AuthenticationError> {
        let state = ConnectionState::Connecting;

        let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) else {
            let state = state.reject();
            tracing::debug!("Handshake without token -> {:?}", state);
            return Err(AuthenticationError::NoToken);
        };

        let user_id = match self.token_verifier.verify(token).await {
            Ok(user_id) => user_id,
            Err(e) => {
                let state = state.reject();
                tracing::debug!("Token verification failed ({}) -> {:?}", e, state);
                return Err(e);
            }
        };

        AuthenticatedConnection::establish(state.accept(user_id))
            .ok_or(AuthenticationError::InvalidToken)
    }

    /// Register an authenticated connection's outbound channel with the room registry.
    ///
    /// Must run before the connection's first join.
    pub async fn admit(
        &self,
        connection: &AuthenticatedConnection,
        channel: PusherChannel,
    ) -> Result<(), MembershipError> {
        self.membership
            .register(connection.id(), connection.user_id().clone(), channel)
            .await
    }
}
