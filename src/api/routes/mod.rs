//! API routes module

pub mod chat;
pub mod health;

use axum::Router;

use super::SharedState;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Chat routes
        .nest("/chat", chat::router())
        // Health and corpus status
        .nest("/health", health::router())
}
