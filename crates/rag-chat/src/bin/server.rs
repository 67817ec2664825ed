//! Chat server binary
//!
//! Run with: cargo run -p rag-chat --bin rag-chat-server

use rag_chat::{ChatConfig, ChatServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_chat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ChatConfig::load()?;
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Mode: {}", config.chat.mode);
    tracing::info!(
        "  - Embeddings: {} ({}, {} dims)",
        config.embeddings.provider,
        config.embeddings.model,
        config.embeddings.dimensions
    );
    tracing::info!("  - LLM: {} ({})", config.llm.provider, config.llm.model);
    tracing::info!("  - Store: {:?} (database: {})", config.store, config.mongo.database);
    tracing::info!("  - Top k: {}", config.chat.top_k);

    let server = ChatServer::new(config).await?;

    println!("\nServer starting...");
    println!("  Chat:   POST http://{}/rag_chat", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  Info:   http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
