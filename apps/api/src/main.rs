mod chat;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod rag;
mod review;
mod routes;
mod state;
mod stats;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::rag::retrieval::{
    ContextRetriever, KeywordRetriever, RetrieverStrategy, VectorRetriever,
};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lexio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.openai_base_url.clone(), config.openai_api_key.clone());
    info!(
        "LLM client initialized (chat: {}, embeddings: {})",
        llm_client::CHAT_MODEL,
        llm_client::EMBEDDING_MODEL
    );

    // Initialize context retriever (VectorRetriever by default — swap via RETRIEVER_STRATEGY)
    let retriever: Arc<dyn ContextRetriever> = match config.retriever_strategy {
        RetrieverStrategy::Vector => Arc::new(VectorRetriever::new(llm.clone())),
        RetrieverStrategy::Keyword => Arc::new(KeywordRetriever),
    };
    info!("Context retriever initialized (strategy: {})", retriever.name());

    // Build app state
    let state = AppState { db, llm, retriever };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
