//! HS256 JSON Web Token verifier.
//!
//! Tokens are signed with a shared secret supplied to the process at startup.
//! The user id is taken from the `id` claim, or from `sub` when `id` is
//! absent. `exp` is honoured when present but not required.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use quadchat_shared::time::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::{AuthenticationError, TokenVerifier, UserId};

/// User id claim; numeric ids are accepted as well as strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ClaimId {
    Text(String),
    Number(i64),
}

impl ClaimId {
    fn into_string(self) -> String {
        match self {
            Self::Text(value) => value,
            Self::Number(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<ClaimId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<u64>,
}

pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtTokenVerifier {
    /// `clock` stamps `iat`/`exp` of issued tokens; verification checks `exp`
    /// against the system time.
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
        }
    }

    /// Sign a token for `user_id`, valid for `ttl` (or forever when `None`).
    ///
    /// Used by the client CLI for local development and by tests.
    pub fn issue_token(
        &self,
        user_id: &UserId,
        ttl: Option<Duration>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = u64::try_from(self.clock.now().timestamp()).unwrap_or_default();

        let claims = Claims {
            id: Some(ClaimId::Text(user_id.as_str().to_string())),
            sub: None,
            exp: ttl.map(|ttl| now + ttl.as_secs()),
            iat: Some(now),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    fn decode_user_id(&self, token: &str) -> Result<UserId, AuthenticationError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AuthenticationError::InvalidToken
        })?;

        let claims = data.claims;
        let raw_id = claims
            .id
            .map(ClaimId::into_string)
            .or(claims.sub)
            .ok_or_else(|| {
                tracing::debug!("Token carries neither an 'id' nor a 'sub' claim");
                AuthenticationError::InvalidToken
            })?;

        UserId::new(raw_id).map_err(|_| AuthenticationError::InvalidToken)
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, AuthenticationError> {
        self.decode_user_id(token)
    }
}
