mod api;
mod chat;
mod completion;
mod config;
mod error;
mod gateway;
mod render;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::chat::ChatService;
use crate::completion::CompletionClient;
use crate::config::AppConfig;
use crate::gateway::UnleashClient;

pub use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
    pub config: Arc<AppConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet_genius=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();

    println!("================================================");
    println!("         WALLET GENIUS - Starting Up            ");
    println!("================================================");

    // Both provider keys are validated here; a missing key is fatal
    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    println!("[CONFIG] Server: {}:{}", config.server.host, config.server.port);
    println!("[CONFIG] Data provider: {}", config.unleash.base_url);
    println!("[CONFIG] Completion model: {}", config.groq.model);

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting Wallet Genius"
    );

    let gateway = UnleashClient::new(&config.unleash);
    let completion = CompletionClient::new(&config.groq);
    let state = AppState {
        chat: ChatService::new(gateway, completion),
        config: Arc::new(config.clone()),
    };

    let app = Router::new()
        .merge(api::create_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    println!("[ROUTER] Routes configured: /chat, /health, /api/v1/wallet/{{wallet}}/*, /debug/api/{{wallet}}");

    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("================================================");
    println!("  Server listening on http://{}", addr);
    println!("================================================");
    println!();

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
