//! Real-time conversation gateway.
//!
//! Authenticates WebSocket clients with a JWT, lets them join conversations,
//! and relays each chat message to the other members once it is stored.
//!
//! Run with:
//! ```not_rust
//! JWT_SECRET=change-me cargo run --bin quadchat-server
//! cargo run --bin quadchat-server -- --jwt-secret change-me --port 3001 \
//!     --allowed-origins http://localhost:3000,https://campus.example
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use quadchat_server::{
    infrastructure::{
        auth::JwtTokenVerifier,
        membership::RoomRegistry,
        store::{InMemoryMessageStore, UserDirectory},
    },
    ui::{AllowedOrigins, Server},
    usecase::{
        AuthenticateConnectionUseCase, DisconnectConnectionUseCase, InspectConversationsUseCase,
        JoinConversationUseCase, RelayMessageUseCase,
    },
};
use quadchat_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "quadchat-server")]
#[command(about = "Real-time conversation gateway", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "QUADCHAT_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "QUADCHAT_PORT", default_value = "8080")]
    port: u16,

    /// Shared secret used to verify bearer tokens (HS256)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Comma-separated origins allowed to connect ("*" allows any)
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    allowed_origins: Vec<String>,

    /// JSON file of `{"id", "name"}` entries; when set, unknown senders are rejected
    #[arg(long, env = "QUADCHAT_USERS_FILE")]
    users_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    if args.jwt_secret.trim().is_empty() {
        tracing::error!("JWT secret must not be empty");
        std::process::exit(1);
    }

    let allowed_origins = match AllowedOrigins::parse(&args.allowed_origins) {
        Ok(origins) => origins,
        Err(e) => {
            tracing::error!("Invalid --allowed-origins: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Collaborators (Token Verifier, Message Store)
    // 2. Room registry
    // 3. UseCases
    // 4. Server

    // 1. Collaborators
    let clock = Arc::new(SystemClock);
    let token_verifier = Arc::new(JwtTokenVerifier::new(&args.jwt_secret, clock.clone()));
    let mut message_store = InMemoryMessageStore::new(clock);
    if let Some(path) = &args.users_file {
        match UserDirectory::load(path) {
            Ok(directory) => {
                tracing::info!(
                    "Loaded {} user(s) from {}",
                    directory.len(),
                    path.display()
                );
                message_store = message_store.with_directory(directory);
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
    let message_store = Arc::new(message_store);

    // 2. Room registry (single-writer task owning the membership table)
    let membership = Arc::new(RoomRegistry::spawn());

    // 3. UseCases
    let authenticate_connection_usecase = Arc::new(AuthenticateConnectionUseCase::new(
        token_verifier,
        membership.clone(),
    ));
    let join_conversation_usecase = Arc::new(JoinConversationUseCase::new(membership.clone()));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        message_store,
        membership.clone(),
    ));
    let disconnect_connection_usecase =
        Arc::new(DisconnectConnectionUseCase::new(membership.clone()));
    let inspect_conversations_usecase = Arc::new(InspectConversationsUseCase::new(membership));

    // 4. Create and run the server
    let server = Server::new(
        authenticate_connection_usecase,
        join_conversation_usecase,
        relay_message_usecase,
        disconnect_connection_usecase,
        inspect_conversations_usecase,
        allowed_origins,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
