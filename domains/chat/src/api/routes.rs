//! Route definitions for Chat domain API

use axum::{routing::post, Router};

use super::handlers::{chat, suggestions};
use super::middleware::ChatState;

/// Create all Chat domain API routes
pub fn routes() -> Router<ChatState> {
    Router::new()
        .route("/api/chat", post(chat::stream_chat))
        .route("/api/suggestions", post(suggestions::suggest))
}
