//! Cross-origin policy.
//!
//! The same allow-list drives the CORS layer for the HTTP routes and the
//! `Origin` check on WebSocket upgrades (browsers do not apply CORS to
//! WebSocket handshakes).

use axum::http::{HeaderValue, Method};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, Error)]
#[error("invalid origin '{0}'")]
pub struct InvalidOriginError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// `*`: every origin is accepted
    Any,
    List(Vec<HeaderValue>),
}

impl AllowedOrigins {
    /// Parse configured origins. A `*` entry allows everything; blank entries are skipped.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, InvalidOriginError> {
        let mut origins = Vec::new();
        for entry in raw.iter().map(|entry| entry.as_ref().trim()) {
            if entry.is_empty() {
                continue;
            }
            if entry == "*" {
                return Ok(Self::Any);
            }
            let value = HeaderValue::from_str(entry.trim_end_matches('/'))
                .map_err(|_| InvalidOriginError(entry.to_string()))?;
            origins.push(value);
        }
        Ok(Self::List(origins))
    }

    pub fn allows(&self, origin: &HeaderValue) -> bool {
        match self {
            Self::Any => true,
            Self::List(origins) => origins.iter().any(|allowed| allowed == origin),
        }
    }

    pub fn cors_layer(&self) -> CorsLayer {
        let allow_origin = match self {
            Self::Any => AllowOrigin::from(Any),
            Self::List(origins) => AllowOrigin::list(origins.clone()),
        };
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET])
            .allow_headers(Any)
    }
}
