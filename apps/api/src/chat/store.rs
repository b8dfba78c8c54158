//! Store access for chat sessions and messages.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::chat::{ChatMessageRow, ChatSessionRow};

pub const DEFAULT_SESSION_TITLE: &str = "New conversation";

pub async fn create_session(
    db: &PgPool,
    user_id: Uuid,
    title: Option<String>,
) -> Result<ChatSessionRow, AppError> {
    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string());

    let session = sqlx::query_as(
        "INSERT INTO chat_sessions (user_id, title) VALUES ($1, $2) RETURNING *",
    )
    .bind(user_id)
    .bind(title)
    .fetch_one(db)
    .await?;
    Ok(session)
}

pub async fn list_sessions(db: &PgPool, user_id: Uuid) -> Result<Vec<ChatSessionRow>, AppError> {
    let sessions = sqlx::query_as(
        "SELECT * FROM chat_sessions WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(sessions)
}

/// Fetches a session the caller owns; another user's session reads as absent.
pub async fn get_owned_session(
    db: &PgPool,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<ChatSessionRow, AppError> {
    let session: Option<ChatSessionRow> =
        sqlx::query_as("SELECT * FROM chat_sessions WHERE id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(db)
            .await?;
    session.ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

pub async fn list_messages(
    db: &PgPool,
    session_id: Uuid,
) -> Result<Vec<ChatMessageRow>, AppError> {
    let messages = sqlx::query_as(
        "SELECT * FROM chat_messages WHERE session_id = $1 ORDER BY created_at ASC",
    )
    .bind(session_id)
    .fetch_all(db)
    .await?;
    Ok(messages)
}

pub async fn append_message(
    db: &PgPool,
    session_id: Uuid,
    role: &str,
    content: &str,
) -> Result<ChatMessageRow, AppError> {
    let message = sqlx::query_as(
        "INSERT INTO chat_messages (session_id, role, content) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(session_id)
    .bind(role)
    .bind(content)
    .fetch_one(db)
    .await?;
    Ok(message)
}

pub async fn touch_session(db: &PgPool, session_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE chat_sessions SET updated_at = now() WHERE id = $1")
        .bind(session_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn rename_session(
    db: &PgPool,
    user_id: Uuid,
    session_id: Uuid,
    title: &str,
) -> Result<ChatSessionRow, AppError> {
    let session: Option<ChatSessionRow> = sqlx::query_as(
        "UPDATE chat_sessions SET title = $3, updated_at = now() \
         WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(session_id)
    .bind(user_id)
    .bind(title)
    .fetch_optional(db)
    .await?;
    session.ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

/// Deletes a session the caller owns; messages go with it via the cascade.
pub async fn delete_session(
    db: &PgPool,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM chat_sessions WHERE id = $1 AND user_id = $2")
        .bind(session_id)
        .bind(user_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Session {session_id} not found")));
    }
    Ok(())
}
