//! Context retrieval — pluggable, trait-based strategies behind one interface.
//!
//! Default: `VectorRetriever` (embedding + pgvector cosine search).
//! Fallback: `KeywordRetriever` (pure-Rust relevance rules, no vector store).
//!
//! `AppState` holds an `Arc<dyn ContextRetriever>`, swapped at startup via
//! `RETRIEVER_STRATEGY`. Whatever the strategy, a *search* failure degrades to
//! an empty context instead of aborting answer generation; only embedding
//! failures propagate.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::learning::{LearningChunkRow, RetrievedContext};
use crate::rag::relevance::rank_by_relevance;
use crate::rag::vector_literal;

/// How many recent chunks the keyword strategy scans per query.
const KEYWORD_CANDIDATE_LIMIT: i64 = 50;

/// Startup-selectable retrieval strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieverStrategy {
    Vector,
    Keyword,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown retriever strategy '{0}'")]
pub struct ParseStrategyError(String);

impl FromStr for RetrieverStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vector" => Ok(RetrieverStrategy::Vector),
            "keyword" => Ok(RetrieverStrategy::Keyword),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

/// The retrieval seam. Implementations return contexts ordered descending by
/// similarity, truncated to `limit`.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    async fn retrieve(
        &self,
        db: &PgPool,
        user_id: Uuid,
        query: &str,
        threshold: f64,
        limit: i64,
    ) -> Result<Vec<RetrievedContext>, AppError>;

    /// Strategy label, for logs and diagnostics.
    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// VectorRetriever — embedding + pgvector cosine search
// ────────────────────────────────────────────────────────────────────────────

pub struct VectorRetriever {
    llm: LlmClient,
}

impl VectorRetriever {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ContextRetriever for VectorRetriever {
    async fn retrieve(
        &self,
        db: &PgPool,
        user_id: Uuid,
        query: &str,
        threshold: f64,
        limit: i64,
    ) -> Result<Vec<RetrievedContext>, AppError> {
        let query_vector = self
            .llm
            .embed(query)
            .await
            .map_err(|e| AppError::ExternalService(format!("Query embedding failed: {e}")))?;

        let result: Result<Vec<RetrievedContext>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT id, content, content_type, tags, metadata,
                   1 - (embedding <=> $2::vector) AS similarity
            FROM learning_chunks
            WHERE user_id = $1
              AND embedding IS NOT NULL
              AND 1 - (embedding <=> $2::vector) >= $3
            ORDER BY embedding <=> $2::vector
            LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(vector_literal(&query_vector))
        .bind(threshold)
        .bind(limit)
        .fetch_all(db)
        .await;

        match result {
            Ok(contexts) => Ok(contexts),
            Err(e) => {
                warn!("Vector search failed, continuing with empty context: {e}");
                Ok(Vec::new())
            }
        }
    }

    fn name(&self) -> &'static str {
        "vector"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordRetriever — relevance rules over recent chunks
// ────────────────────────────────────────────────────────────────────────────

pub struct KeywordRetriever;

#[async_trait]
impl ContextRetriever for KeywordRetriever {
    async fn retrieve(
        &self,
        db: &PgPool,
        user_id: Uuid,
        query: &str,
        _threshold: f64, // thresholds live in vector-similarity space; keyword scores filter on > 0
        limit: i64,
    ) -> Result<Vec<RetrievedContext>, AppError> {
        let result: Result<Vec<LearningChunkRow>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT id, user_id, content, content_type, tags, metadata, created_at
            FROM learning_chunks
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(KEYWORD_CANDIDATE_LIMIT)
        .fetch_all(db)
        .await;

        let chunks = match result {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!("Keyword candidate scan failed, continuing with empty context: {e}");
                return Ok(Vec::new());
            }
        };

        Ok(score_keyword_contexts(query, &chunks, limit as usize))
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Ranks chunks by relevance and normalizes scores against the batch maximum
/// so the top hit reports similarity 1.0. Relevance scores are unnormalized
/// keyword counts; the prompt builder expects a [0, 1] similarity.
fn score_keyword_contexts(
    query: &str,
    chunks: &[LearningChunkRow],
    limit: usize,
) -> Vec<RetrievedContext> {
    let ranked = rank_by_relevance(query, chunks);

    let max_score = ranked.first().map(|(_, score)| *score).unwrap_or(0);
    if max_score == 0 {
        return Vec::new();
    }

    ranked
        .into_iter()
        .take(limit)
        .map(|(chunk, score)| RetrievedContext {
            id: chunk.id,
            content: chunk.content.clone(),
            content_type: chunk.content_type,
            tags: chunk.tags.clone(),
            metadata: chunk.metadata.clone(),
            similarity: score as f64 / max_score as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::learning::ContentType;
    use chrono::Utc;
    use serde_json::json;

    fn make_chunk(content: &str, tags: &[&str]) -> LearningChunkRow {
        LearningChunkRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: content.to_string(),
            content_type: ContentType::Note,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            metadata: json!({}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_strategy_parses_known_names() {
        assert_eq!(
            "vector".parse::<RetrieverStrategy>().unwrap(),
            RetrieverStrategy::Vector
        );
        assert_eq!(
            "keyword".parse::<RetrieverStrategy>().unwrap(),
            RetrieverStrategy::Keyword
        );
        assert!("cosine".parse::<RetrieverStrategy>().is_err());
    }

    #[test]
    fn test_keyword_scores_normalized_to_top_hit() {
        // Tagged chunk scores 3 (tag hit + keyword), untagged scores 1.
        let chunks = vec![
            make_chunk("the particle wa marks the topic", &["particle"]),
            make_chunk("a particle appears here", &[]),
        ];
        let contexts = score_keyword_contexts("particle", &chunks, 5);

        assert_eq!(contexts.len(), 2);
        assert!((contexts[0].similarity - 1.0).abs() < f64::EPSILON);
        assert!(contexts[1].similarity < contexts[0].similarity);
    }

    #[test]
    fn test_keyword_no_match_is_empty() {
        let chunks = vec![make_chunk("unrelated body", &[])];
        assert!(score_keyword_contexts("weather", &chunks, 5).is_empty());
    }

    #[test]
    fn test_keyword_respects_limit() {
        let chunks: Vec<LearningChunkRow> =
            (0..10).map(|_| make_chunk("shared keyword", &[])).collect();
        let contexts = score_keyword_contexts("keyword", &chunks, 3);
        assert_eq!(contexts.len(), 3);
    }
}
