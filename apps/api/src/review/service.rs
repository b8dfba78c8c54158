//! Store-facing review operations: due-item listing and progress upserts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::learning::{ContentType, LearningProgressRow};
use crate::review::schedule::{
    days_since_review, next_review_date, review_priority, ReviewPriority,
};

/// One due item, ready for the review screen.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewItem {
    pub chunk_id: Uuid,
    pub content: String,
    pub content_type: ContentType,
    pub tags: Vec<String>,
    pub metadata: Value,
    pub mastery_level: i32,
    pub days_since_review: i64,
    pub priority: ReviewPriority,
}

#[derive(Debug, FromRow)]
struct DueRow {
    chunk_id: Uuid,
    content: String,
    content_type: ContentType,
    tags: Vec<String>,
    metadata: Value,
    mastery_level: i32,
    last_reviewed: Option<DateTime<Utc>>,
}

/// Lists the caller's due items, most urgent first.
///
/// The store returns rows ordered by `next_review` ascending; the priority
/// sort is stable, so items in the same bucket keep that upstream order.
pub async fn list_due_reviews(
    db: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<ReviewItem>, AppError> {
    let rows: Vec<DueRow> = sqlx::query_as(
        r#"
        SELECT p.chunk_id, c.content, c.content_type, c.tags, c.metadata,
               p.mastery_level, p.last_reviewed
        FROM learning_progress p
        JOIN learning_chunks c ON c.id = p.chunk_id
        WHERE p.user_id = $1 AND p.next_review <= $2
        ORDER BY p.next_review ASC
        "#,
    )
    .bind(user_id)
    .bind(now)
    .fetch_all(db)
    .await?;

    let mut items: Vec<ReviewItem> = rows
        .into_iter()
        .map(|row| {
            let days = days_since_review(now, row.last_reviewed);
            ReviewItem {
                chunk_id: row.chunk_id,
                content: row.content,
                content_type: row.content_type,
                tags: row.tags,
                metadata: row.metadata,
                mastery_level: row.mastery_level,
                days_since_review: days,
                priority: review_priority(days, row.mastery_level),
            }
        })
        .collect();

    items.sort_by_key(|item| item.priority.rank());
    Ok(items)
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressParams {
    pub user_id: Uuid,
    pub chunk_id: Uuid,
    pub mastery_level: i32,
}

/// Records a review event: bumps the review count by exactly one and derives
/// the next review date from the ladder. The caller supplies the new mastery
/// level — any value in [0, 5] is accepted, not only +1 steps.
///
/// Keyed upsert on (user_id, chunk_id); concurrent updates resolve through
/// the store's unique constraint.
pub async fn update_progress(
    db: &PgPool,
    params: &UpdateProgressParams,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, AppError> {
    if !(0..=5).contains(&params.mastery_level) {
        return Err(AppError::Validation(
            "Mastery level must be between 0 and 5".to_string(),
        ));
    }

    let existing: Option<LearningProgressRow> = sqlx::query_as(
        "SELECT * FROM learning_progress WHERE user_id = $1 AND chunk_id = $2",
    )
    .bind(params.user_id)
    .bind(params.chunk_id)
    .fetch_optional(db)
    .await?;

    let review_count = existing.map(|p| p.review_count + 1).unwrap_or(1);
    let next_review = next_review_date(now, params.mastery_level, review_count);

    sqlx::query(
        r#"
        INSERT INTO learning_progress
            (user_id, chunk_id, mastery_level, last_reviewed, next_review, review_count)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id, chunk_id) DO UPDATE SET
            mastery_level = EXCLUDED.mastery_level,
            last_reviewed = EXCLUDED.last_reviewed,
            next_review = EXCLUDED.next_review,
            review_count = EXCLUDED.review_count
        "#,
    )
    .bind(params.user_id)
    .bind(params.chunk_id)
    .bind(params.mastery_level)
    .bind(now)
    .bind(next_review)
    .bind(review_count)
    .execute(db)
    .await?;

    Ok(next_review)
}

/// Raw progress rows for a user, optionally narrowed to one chunk.
pub async fn list_progress(
    db: &PgPool,
    user_id: Uuid,
    chunk_id: Option<Uuid>,
) -> Result<Vec<LearningProgressRow>, AppError> {
    let rows = match chunk_id {
        Some(chunk_id) => {
            sqlx::query_as(
                "SELECT * FROM learning_progress WHERE user_id = $1 AND chunk_id = $2",
            )
            .bind(user_id)
            .bind(chunk_id)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM learning_progress WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(db)
                .await?
        }
    };
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_item(priority: ReviewPriority, marker: &str) -> ReviewItem {
        ReviewItem {
            chunk_id: Uuid::new_v4(),
            content: marker.to_string(),
            content_type: ContentType::Note,
            tags: vec![],
            metadata: json!({}),
            mastery_level: 2,
            days_since_review: 0,
            priority,
        }
    }

    #[test]
    fn test_priority_sort_is_stable_within_bucket() {
        let mut items = vec![
            make_item(ReviewPriority::Low, "low-1"),
            make_item(ReviewPriority::High, "high-1"),
            make_item(ReviewPriority::Low, "low-2"),
            make_item(ReviewPriority::High, "high-2"),
        ];
        items.sort_by_key(|item| item.priority.rank());

        let order: Vec<&str> = items.iter().map(|i| i.content.as_str()).collect();
        assert_eq!(order, vec!["high-1", "high-2", "low-1", "low-2"]);
    }
}
