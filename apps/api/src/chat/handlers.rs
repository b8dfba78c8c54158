//! Axum route handlers for chat sessions and messages.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::store::{
    append_message, create_session, delete_session, get_owned_session, list_messages,
    list_sessions, rename_session, touch_session,
};
use crate::errors::AppError;
use crate::llm_client::{ChatRole, ChatTurn};
use crate::models::chat::{ChatMessageRow, ChatSessionRow};
use crate::rag::assistant::answer_with_context;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: Uuid,
    pub title: Option<String>,
}

/// POST /api/v1/chat/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ChatSessionRow>), AppError> {
    let session = create_session(&state.db, req.user_id, req.title).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<ChatSessionRow>,
}

/// GET /api/v1/chat/sessions
pub async fn handle_list_sessions(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SessionListResponse>, AppError> {
    let sessions = list_sessions(&state.db, params.user_id).await?;
    Ok(Json(SessionListResponse { sessions }))
}

#[derive(Debug, Serialize)]
pub struct SessionMessagesResponse {
    pub session: ChatSessionRow,
    pub messages: Vec<ChatMessageRow>,
}

/// GET /api/v1/chat/sessions/:id/messages
pub async fn handle_list_messages(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SessionMessagesResponse>, AppError> {
    let session = get_owned_session(&state.db, params.user_id, session_id).await?;
    let messages = list_messages(&state.db, session_id).await?;
    Ok(Json(SessionMessagesResponse { session, messages }))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub user_message: ChatMessageRow,
    pub assistant_message: ChatMessageRow,
}

/// POST /api/v1/chat/messages
///
/// Persists the user turn, answers it grounded in the caller's knowledge base
/// with the session history as prior turns, persists the assistant turn.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation(
            "Message content must not be empty".to_string(),
        ));
    }

    let session = get_owned_session(&state.db, req.user_id, req.session_id).await?;

    let history = list_messages(&state.db, session.id).await?;
    let mut turns: Vec<ChatTurn> = history
        .iter()
        .map(|m| ChatTurn {
            role: if m.role == "assistant" {
                ChatRole::Assistant
            } else {
                ChatRole::User
            },
            content: m.content.clone(),
        })
        .collect();

    let user_message = append_message(&state.db, session.id, "user", &req.content).await?;
    turns.push(ChatTurn {
        role: ChatRole::User,
        content: req.content.clone(),
    });

    let grounded = answer_with_context(
        &state.db,
        &state.llm,
        state.retriever.as_ref(),
        req.user_id,
        &turns,
        &req.content,
    )
    .await?;

    let assistant_message =
        append_message(&state.db, session.id, "assistant", &grounded.answer).await?;
    touch_session(&state.db, session.id).await?;

    Ok(Json(SendMessageResponse {
        user_message,
        assistant_message,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RenameSessionRequest {
    pub user_id: Uuid,
    pub title: String,
}

/// PATCH /api/v1/chat/sessions/:id
pub async fn handle_rename_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<RenameSessionRequest>,
) -> Result<Json<ChatSessionRow>, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }
    let session = rename_session(&state.db, req.user_id, session_id, title).await?;
    Ok(Json(session))
}

/// DELETE /api/v1/chat/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    delete_session(&state.db, params.user_id, session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
