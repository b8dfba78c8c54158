//! Axum route handlers for the learning-content and assistant APIs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{ChatRole, ChatTurn};
use crate::models::learning::{ContentType, LearningChunkRow};
use crate::rag::assistant::{
    answer_with_context, find_related_contents, learning_recommendations, personalized_qa,
    GroundedAnswer, LearningRecommendations, RelatedContent,
};
use crate::rag::ingest::add_learning_content;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Content ingestion / listing / deletion
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddContentRequest {
    pub user_id: Uuid,
    pub content: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AddContentResponse {
    pub chunk_ids: Vec<Uuid>,
}

/// POST /api/v1/learning/content
pub async fn handle_add_content(
    State(state): State<AppState>,
    Json(req): Json<AddContentRequest>,
) -> Result<Json<AddContentResponse>, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("Content must not be empty".to_string()));
    }
    let metadata = match req.metadata {
        None => Value::Object(Default::default()),
        Some(value @ Value::Object(_)) => value,
        Some(_) => {
            return Err(AppError::Validation(
                "Metadata must be an object".to_string(),
            ))
        }
    };

    let chunk_ids = add_learning_content(
        &state.db,
        &state.llm,
        req.user_id,
        &req.content,
        req.content_type,
        &req.tags,
        &metadata,
    )
    .await?;

    Ok(Json(AddContentResponse { chunk_ids }))
}

#[derive(Debug, Deserialize)]
pub struct ListContentQuery {
    pub user_id: Uuid,
    pub content_type: Option<ContentType>,
    pub tag: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListContentResponse {
    pub contents: Vec<LearningChunkRow>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// GET /api/v1/learning/content
pub async fn handle_list_content(
    State(state): State<AppState>,
    Query(params): Query<ListContentQuery>,
) -> Result<Json<ListContentResponse>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let contents: Vec<LearningChunkRow> = sqlx::query_as(
        r#"
        SELECT id, user_id, content, content_type, tags, metadata, created_at
        FROM learning_chunks
        WHERE user_id = $1
          AND ($2::content_type IS NULL OR content_type = $2)
          AND ($3::text IS NULL OR $3 = ANY(tags))
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(params.user_id)
    .bind(params.content_type)
    .bind(&params.tag)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM learning_chunks
        WHERE user_id = $1
          AND ($2::content_type IS NULL OR content_type = $2)
          AND ($3::text IS NULL OR $3 = ANY(tags))
        "#,
    )
    .bind(params.user_id)
    .bind(params.content_type)
    .bind(&params.tag)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(ListContentResponse {
        contents,
        total,
        page,
        limit,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// DELETE /api/v1/learning/content/:id
/// Scoped strictly to (user, chunk): another user's content reads as absent.
pub async fn handle_delete_content(
    State(state): State<AppState>,
    Path(chunk_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM learning_chunks WHERE id = $1 AND user_id = $2")
        .bind(chunk_id)
        .bind(params.user_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Chunk {chunk_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Grounded chat
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: Uuid,
    pub messages: Vec<ChatTurn>,
}

/// POST /api/v1/learning/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<GroundedAnswer>, AppError> {
    let latest = req.messages.last().ok_or_else(|| {
        AppError::Validation("Message list must not be empty".to_string())
    })?;
    if latest.role != ChatRole::User {
        return Err(AppError::Validation(
            "The last message must be a user message".to_string(),
        ));
    }

    let query = latest.content.clone();
    let grounded = answer_with_context(
        &state.db,
        &state.llm,
        state.retriever.as_ref(),
        req.user_id,
        &req.messages,
        &query,
    )
    .await?;

    Ok(Json(grounded))
}

// ────────────────────────────────────────────────────────────────────────────
// Assistant: Q&A, related content, recommendations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QaRequest {
    pub user_id: Uuid,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QaResponse {
    pub question: String,
    pub answer: String,
}

/// POST /api/v1/assistant/qa
pub async fn handle_qa(
    State(state): State<AppState>,
    Json(req): Json<QaRequest>,
) -> Result<Json<QaResponse>, AppError> {
    if req.question.trim().is_empty() {
        return Err(AppError::Validation("Question must not be empty".to_string()));
    }

    let answer = personalized_qa(&state.db, &state.llm, req.user_id, &req.question).await?;
    Ok(Json(QaResponse {
        question: req.question,
        answer,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub user_id: Uuid,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RelatedResponse {
    pub chunk_id: Uuid,
    pub related: Vec<RelatedContent>,
    pub count: usize,
}

/// GET /api/v1/assistant/related/:chunk_id
pub async fn handle_related(
    State(state): State<AppState>,
    Path(chunk_id): Path<Uuid>,
    Query(params): Query<RelatedQuery>,
) -> Result<Json<RelatedResponse>, AppError> {
    let limit = params.limit.unwrap_or(5).clamp(1, 20);
    let related = find_related_contents(&state.db, params.user_id, chunk_id, limit).await?;
    let count = related.len();
    Ok(Json(RelatedResponse {
        chunk_id,
        related,
        count,
    }))
}

/// GET /api/v1/assistant/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<LearningRecommendations>, AppError> {
    let recommendations =
        learning_recommendations(&state.db, params.user_id, Utc::now()).await?;
    Ok(Json(recommendations))
}
