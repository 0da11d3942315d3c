//! Router for the health API

use axum::{Json, Router, extract::State, routing::get};

use super::public::{CorpusStatus, HealthResponse};
use crate::api::SharedState;

/// Reports whether the corpus was built and why not if it wasn't.
/// The server keeps answering chats either way.
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let corpus = &state.corpus;
    Json(HealthResponse {
        status: "ok".to_string(),
        corpus: CorpusStatus::new(
            corpus.source(),
            corpus.chars(),
            corpus.built_at(),
            corpus.error(),
        ),
    })
}

/// Create the health router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(health))
}
