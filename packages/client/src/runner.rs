//! Client execution logic with reconnection support.

use std::time::Duration;

use super::{
    domain::{should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    session::{SessionConfig, run_client_session},
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the terminal client, reconnecting when the connection drops
pub async fn run_client(config: SessionConfig) -> Result<(), ClientError> {
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} for conversation '{}' (attempt {}/{})",
            config.url,
            config.conversation_id,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        let error = match run_client_session(&config).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) => e,
        };

        if should_exit_immediately(&error) {
            tracing::error!("{}", error);
            tracing::error!("The gateway rejected the token. Exiting.");
            return Err(error);
        }

        tracing::warn!("Connection lost: {}", error);
        reconnect_count += 1;

        if !should_attempt_reconnect(&error, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
            tracing::error!(
                "Failed to reconnect after {} attempts. Exiting.",
                MAX_RECONNECT_ATTEMPTS
            );
            return Err(error);
        }

        tracing::info!(
            "Reconnecting in {} seconds... (attempt {}/{})",
            RECONNECT_INTERVAL_SECS,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
    }
}
