use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// The fixed set of learning content categories.
/// Mirrors the `content_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "content_type", rename_all = "lowercase")]
pub enum ContentType {
    Vocabulary,
    Grammar,
    Note,
    Example,
}

impl ContentType {
    /// Human-readable label used when rendering retrieved contexts into a prompt.
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Vocabulary => "Vocabulary",
            ContentType::Grammar => "Grammar",
            ContentType::Note => "Note",
            ContentType::Example => "Example",
        }
    }
}

/// A persisted unit of learning content. Immutable after ingestion except for
/// deletion, which is scoped to `(user_id, id)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LearningChunkRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub content_type: ContentType,
    pub tags: Vec<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

/// Spaced-repetition state for one (user, chunk) pair. `next_review` is always
/// derived by the scheduler, never written directly by a caller.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LearningProgressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub chunk_id: Uuid,
    pub mastery_level: i32,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
}

/// A retrieved chunk plus its similarity score, used to ground a generated answer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RetrievedContext {
    pub id: Uuid,
    pub content: String,
    pub content_type: ContentType,
    pub tags: Vec<String>,
    pub metadata: Value,
    pub similarity: f64,
}
