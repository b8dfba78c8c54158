//! Axum route handlers for progress updates and review listings.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::learning::LearningProgressRow;
use crate::review::service::{
    list_due_reviews, list_progress, update_progress, ReviewItem, UpdateProgressParams,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UpdateProgressResponse {
    pub next_review: DateTime<Utc>,
}

/// POST /api/v1/learning/progress
pub async fn handle_update_progress(
    State(state): State<AppState>,
    Json(req): Json<UpdateProgressParams>,
) -> Result<Json<UpdateProgressResponse>, AppError> {
    let next_review = update_progress(&state.db, &req, Utc::now()).await?;
    Ok(Json(UpdateProgressResponse { next_review }))
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub user_id: Uuid,
    pub chunk_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProgressListResponse {
    pub progress: Vec<LearningProgressRow>,
}

/// GET /api/v1/learning/progress
pub async fn handle_list_progress(
    State(state): State<AppState>,
    Query(params): Query<ProgressQuery>,
) -> Result<Json<ProgressListResponse>, AppError> {
    let progress = list_progress(&state.db, params.user_id, params.chunk_id).await?;
    Ok(Json(ProgressListResponse { progress }))
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub review_items: Vec<ReviewItem>,
    pub total_due: usize,
}

/// GET /api/v1/learning/review
pub async fn handle_list_due_reviews(
    State(state): State<AppState>,
    Query(params): Query<ReviewQuery>,
) -> Result<Json<ReviewListResponse>, AppError> {
    let review_items = list_due_reviews(&state.db, params.user_id, Utc::now()).await?;
    let total_due = review_items.len();
    Ok(Json(ReviewListResponse {
        review_items,
        total_due,
    }))
}
