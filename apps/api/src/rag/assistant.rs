//! Assistant services: grounded chat answers, personalized Q&A, related
//! content and recommendations. DB and LLM access happens here; the scoring
//! and rendering logic it drives stays pure in the sibling modules.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::{CHAT_SYSTEM_PROMPT, QA_SYSTEM_PROMPT};
use crate::llm_client::{ChatRole, ChatTurn, LlmClient};
use crate::models::learning::LearningChunkRow;
use crate::rag::prompt::build_context_prompt;
use crate::rag::recommend::{
    build_recommendations, review_candidates, suggest_topics, RecommendationSignals,
    EMPTY_LIBRARY_RECOMMENDATION, STARTER_TOPICS,
};
use crate::rag::relevance::{rank_by_relevance, similarity_score, RELATED_MIN_SIMILARITY};
use crate::rag::retrieval::ContextRetriever;
use crate::rag::{MATCH_COUNT, MATCH_THRESHOLD};

/// Returned by the Q&A path when the caller has no content at all.
pub const EMPTY_LIBRARY_ANSWER: &str =
    "You have not added any learning content yet. Add some study materials first, then ask again.";

/// How many recent chunks the Q&A path considers.
const QA_CANDIDATE_LIMIT: i64 = 50;

/// How many recent sessions feed the chat-activity signal.
const RECENT_SESSION_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct GroundedAnswer {
    pub answer: String,
    pub context_count: usize,
}

/// Answers the latest user turn grounded in retrieved contexts.
///
/// `turns` is the full conversation including the latest user message;
/// `query` is that message's text, used for retrieval. Retrieval runs through
/// the configured strategy with the standard threshold and limit.
pub async fn answer_with_context(
    db: &PgPool,
    llm: &LlmClient,
    retriever: &dyn ContextRetriever,
    user_id: Uuid,
    turns: &[ChatTurn],
    query: &str,
) -> Result<GroundedAnswer, AppError> {
    let contexts = retriever
        .retrieve(db, user_id, query, MATCH_THRESHOLD, MATCH_COUNT)
        .await?;
    debug!(
        "Retrieved {} context(s) via '{}' strategy",
        contexts.len(),
        retriever.name()
    );

    let system = CHAT_SYSTEM_PROMPT.replace("{context}", &build_context_prompt(&contexts));

    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatTurn {
        role: ChatRole::System,
        content: system,
    });
    messages.extend(turns.iter().cloned());

    let answer = llm
        .chat(&messages)
        .await
        .map_err(|e| AppError::ExternalService(format!("Answer generation failed: {e}")))?;

    Ok(GroundedAnswer {
        answer,
        context_count: contexts.len(),
    })
}

/// Personalized Q&A over the caller's recent materials, grounded by the
/// keyword relevance rules. An empty library short-circuits with a fixed
/// onboarding sentence — no LLM call.
pub async fn personalized_qa(
    db: &PgPool,
    llm: &LlmClient,
    user_id: Uuid,
    question: &str,
) -> Result<String, AppError> {
    let chunks: Vec<LearningChunkRow> = sqlx::query_as(
        r#"
        SELECT id, user_id, content, content_type, tags, metadata, created_at
        FROM learning_chunks
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(QA_CANDIDATE_LIMIT)
    .fetch_all(db)
    .await?;

    if chunks.is_empty() {
        return Ok(EMPTY_LIBRARY_ANSWER.to_string());
    }

    let relevant = rank_by_relevance(question, &chunks);
    let context = relevant
        .iter()
        .map(|(chunk, _)| {
            format!(
                "Type: {}\nContent: {}",
                chunk.content_type.label(),
                chunk.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    let messages = [
        ChatTurn {
            role: ChatRole::System,
            content: QA_SYSTEM_PROMPT.replace("{context}", &context),
        },
        ChatTurn {
            role: ChatRole::User,
            content: question.to_string(),
        },
    ];

    llm.chat(&messages)
        .await
        .map_err(|e| AppError::ExternalService(format!("Personalized answer failed: {e}")))
}

#[derive(Debug, Serialize)]
pub struct RelatedContent {
    #[serde(flatten)]
    pub chunk: LearningChunkRow,
    pub similarity: f32,
}

/// Pairwise-similar chunks for a target the caller owns.
/// The target must exist and belong to the caller.
pub async fn find_related_contents(
    db: &PgPool,
    user_id: Uuid,
    chunk_id: Uuid,
    limit: usize,
) -> Result<Vec<RelatedContent>, AppError> {
    let target: Option<LearningChunkRow> = sqlx::query_as(
        r#"
        SELECT id, user_id, content, content_type, tags, metadata, created_at
        FROM learning_chunks
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(chunk_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    let target = target.ok_or_else(|| AppError::NotFound(format!("Chunk {chunk_id} not found")))?;

    let others: Vec<LearningChunkRow> = sqlx::query_as(
        r#"
        SELECT id, user_id, content, content_type, tags, metadata, created_at
        FROM learning_chunks
        WHERE user_id = $1 AND id <> $2
        "#,
    )
    .bind(user_id)
    .bind(chunk_id)
    .fetch_all(db)
    .await?;

    let mut related: Vec<RelatedContent> = others
        .into_iter()
        .map(|chunk| {
            let similarity = similarity_score(&target, &chunk);
            RelatedContent { chunk, similarity }
        })
        .filter(|r| r.similarity > RELATED_MIN_SIMILARITY)
        .collect();

    related.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    related.truncate(limit);
    Ok(related)
}

#[derive(Debug, Serialize)]
pub struct LearningRecommendations {
    pub recommendations: Vec<String>,
    pub suggested_topics: Vec<String>,
    pub review_contents: Vec<LearningChunkRow>,
}

/// Rule-based study suggestions from the caller's library and chat activity.
pub async fn learning_recommendations(
    db: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<LearningRecommendations, AppError> {
    let chunks: Vec<LearningChunkRow> = sqlx::query_as(
        r#"
        SELECT id, user_id, content, content_type, tags, metadata, created_at
        FROM learning_chunks
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    if chunks.is_empty() {
        return Ok(LearningRecommendations {
            recommendations: vec![EMPTY_LIBRARY_RECOMMENDATION.to_string()],
            suggested_topics: STARTER_TOPICS.iter().map(|t| t.to_string()).collect(),
            review_contents: Vec::new(),
        });
    }

    let recent_user_questions: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM chat_messages m
        WHERE m.role = 'user' AND m.session_id IN (
            SELECT id FROM chat_sessions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
        )
        "#,
    )
    .bind(user_id)
    .bind(RECENT_SESSION_LIMIT)
    .fetch_one(db)
    .await?;

    let signals = RecommendationSignals::from_library(&chunks, recent_user_questions as usize);

    Ok(LearningRecommendations {
        recommendations: build_recommendations(&signals),
        suggested_topics: suggest_topics(&signals),
        review_contents: review_candidates(&chunks, now),
    })
}
