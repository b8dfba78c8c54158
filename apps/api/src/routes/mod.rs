pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::{chat, rag, review, stats};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Learning content
        .route(
            "/api/v1/learning/content",
            post(rag::handlers::handle_add_content).get(rag::handlers::handle_list_content),
        )
        .route(
            "/api/v1/learning/content/:id",
            delete(rag::handlers::handle_delete_content),
        )
        // Grounded chat (stateless)
        .route("/api/v1/learning/chat", post(rag::handlers::handle_chat))
        // Spaced repetition
        .route(
            "/api/v1/learning/progress",
            post(review::handlers::handle_update_progress)
                .get(review::handlers::handle_list_progress),
        )
        .route(
            "/api/v1/learning/review",
            get(review::handlers::handle_list_due_reviews),
        )
        .route(
            "/api/v1/learning/stats",
            get(stats::handlers::handle_stats),
        )
        // Assistant (keyword fallback path)
        .route("/api/v1/assistant/qa", post(rag::handlers::handle_qa))
        .route(
            "/api/v1/assistant/related/:chunk_id",
            get(rag::handlers::handle_related),
        )
        .route(
            "/api/v1/assistant/recommendations",
            get(rag::handlers::handle_recommendations),
        )
        // Chat sessions
        .route(
            "/api/v1/chat/sessions",
            post(chat::handlers::handle_create_session).get(chat::handlers::handle_list_sessions),
        )
        .route(
            "/api/v1/chat/sessions/:id",
            patch(chat::handlers::handle_rename_session)
                .delete(chat::handlers::handle_delete_session),
        )
        .route(
            "/api/v1/chat/sessions/:id/messages",
            get(chat::handlers::handle_list_messages),
        )
        .route(
            "/api/v1/chat/messages",
            post(chat::handlers::handle_send_message),
        )
        .with_state(state)
}
