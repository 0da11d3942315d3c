//! Router for the chat API

use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use http::HeaderMap;

use super::public;
use crate::api::SharedState;
use crate::api::public::ApiError;

/// Answer one chat turn and return the updated history
async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<public::ChatResponse>, ApiError> {
    let payload = public::ChatRequest::from_request(&headers, &body);
    let turn = state.chat.respond(&payload.message, &payload.history).await?;
    Ok(Json(turn))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}
