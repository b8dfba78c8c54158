use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::LlmClient;
use crate::rag::retrieval::ContextRetriever;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// Pluggable context retriever. Default: VectorRetriever. Swap via RETRIEVER_STRATEGY env.
    pub retriever: Arc<dyn ContextRetriever>,
}
