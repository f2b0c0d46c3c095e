//! Terminal chat client for the conversation gateway.
//!
//! Connects with a bearer token, joins one conversation, sends each stdin
//! line as a message and prints messages relayed from the other members.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//! A rejected token exits immediately.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin quadchat-client -- --token <jwt> --conversation c1
//! cargo run --bin quadchat-client -- --mint-token-for u1 --jwt-secret change-me
//! ```

use std::sync::Arc;

use clap::Parser;
use quadchat_client::{SessionConfig, run_client};
use quadchat_server::{domain::UserId, infrastructure::auth::JwtTokenVerifier};
use quadchat_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "quadchat-client")]
#[command(about = "Terminal client for the conversation gateway", long_about = None)]
struct Args {
    /// Gateway WebSocket URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Bearer token (JWT) identifying the user
    #[arg(
        short = 't',
        long,
        env = "QUADCHAT_TOKEN",
        hide_env_values = true,
        required_unless_present = "mint_token_for"
    )]
    token: Option<String>,

    /// Conversation to join
    #[arg(short = 'c', long, required_unless_present = "mint_token_for")]
    conversation: Option<String>,

    /// Print a development token for this user id and exit
    #[arg(long, requires = "jwt_secret")]
    mint_token_for: Option<String>,

    /// Secret used with --mint-token-for
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

fn mint_token(user_id: String, secret: &str) -> Result<String, Box<dyn std::error::Error>> {
    let user_id = UserId::new(user_id)?;
    Ok(JwtTokenVerifier::new(secret, Arc::new(SystemClock)).issue_token(&user_id, None)?)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Some(user_id) = args.mint_token_for {
        let secret = args.jwt_secret.unwrap_or_default();
        match mint_token(user_id, &secret) {
            Ok(token) => println!("{}", token),
            Err(e) => {
                tracing::error!("Failed to mint token: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let (Some(token), Some(conversation_id)) = (args.token, args.conversation) else {
        tracing::error!("--token and --conversation are required");
        std::process::exit(2);
    };

    let config = SessionConfig {
        url: args.url,
        token,
        conversation_id,
    };

    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
