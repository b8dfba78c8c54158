//! Content ingestion: chunk, embed, persist, seed progress.

use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::learning::ContentType;
use crate::rag::chunker::split_text;
use crate::rag::vector_literal;
use crate::review::schedule::next_review_date;

/// Chunks `content`, embeds each span and persists it with a fresh progress
/// record (mastery 0, review count 0, first review due after the initial
/// ladder interval). Returns the created chunk ids in order.
///
/// Chunks are inserted sequentially and independently: a failure partway
/// (typically an embedding-provider error) leaves the earlier chunks
/// persisted. Callers see the error; there is no cross-chunk rollback.
pub async fn add_learning_content(
    db: &PgPool,
    llm: &LlmClient,
    user_id: Uuid,
    content: &str,
    content_type: ContentType,
    tags: &[String],
    metadata: &Value,
) -> Result<Vec<Uuid>, AppError> {
    let spans = split_text(content);
    let mut chunk_ids = Vec::with_capacity(spans.len());

    for span in &spans {
        let embedding = llm
            .embed(span)
            .await
            .map_err(|e| AppError::ExternalService(format!("Chunk embedding failed: {e}")))?;

        let chunk_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO learning_chunks (user_id, content, content_type, tags, metadata, embedding)
            VALUES ($1, $2, $3, $4, $5, $6::vector)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(span)
        .bind(content_type)
        .bind(tags)
        .bind(metadata)
        .bind(vector_literal(&embedding))
        .fetch_one(db)
        .await?;

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO learning_progress (user_id, chunk_id, mastery_level, review_count, next_review)
            VALUES ($1, $2, 0, 0, $3)
            "#,
        )
        .bind(user_id)
        .bind(chunk_id)
        .bind(next_review_date(now, 0, 0))
        .execute(db)
        .await?;

        chunk_ids.push(chunk_id);
    }

    info!(
        "Ingested {} chunk(s) of {:?} content for user {}",
        chunk_ids.len(),
        content_type,
        user_id
    );
    Ok(chunk_ids)
}
