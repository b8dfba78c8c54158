//! Axum route handler for the stats view.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::learning::ContentType;
use crate::state::AppState;
use crate::stats::{aggregate_stats, LearningStats};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub user_id: Uuid,
}

#[derive(Debug, FromRow)]
struct ChunkStatRow {
    content_type: ContentType,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ProgressStatRow {
    mastery_level: i32,
    last_reviewed: Option<DateTime<Utc>>,
}

/// GET /api/v1/learning/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<LearningStats>, AppError> {
    let chunks: Vec<ChunkStatRow> =
        sqlx::query_as("SELECT content_type, created_at FROM learning_chunks WHERE user_id = $1")
            .bind(params.user_id)
            .fetch_all(&state.db)
            .await?;

    let progress: Vec<ProgressStatRow> = sqlx::query_as(
        "SELECT mastery_level, last_reviewed FROM learning_progress WHERE user_id = $1",
    )
    .bind(params.user_id)
    .fetch_all(&state.db)
    .await?;

    let chunk_pairs: Vec<(ContentType, DateTime<Utc>)> = chunks
        .into_iter()
        .map(|row| (row.content_type, row.created_at))
        .collect();
    let progress_pairs: Vec<(i32, Option<DateTime<Utc>>)> = progress
        .into_iter()
        .map(|row| (row.mastery_level, row.last_reviewed))
        .collect();

    Ok(Json(aggregate_stats(Utc::now(), &chunk_pairs, &progress_pairs)))
}
