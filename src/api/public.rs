//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::ai::chat::ChatError;
use crate::openai::CompletionError;

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            status: None,
            body: None,
        }
    }
}

// Errors

pub struct ApiError(anyhow::Error);

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        let Some(err) = self.0.downcast_ref::<ChatError>() else {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(&format!("Something went wrong: {}", self.0)),
            );
        };

        match err {
            ChatError::Validation => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("message is required"),
            ),
            ChatError::Completion(CompletionError::Unreachable(detail)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(&format!("request failed: {}", detail)),
            ),
            ChatError::Completion(CompletionError::Upstream { status, body }) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                ErrorResponse {
                    error: "upstream_error".to_string(),
                    status: Some(*status),
                    body: Some(body.clone()),
                },
            ),
            ChatError::Completion(CompletionError::InvalidResponse(detail)) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::new(&format!("invalid upstream response: {}", detail)),
            ),
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        // Always log the error
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        } else {
            tracing::warn!("{}", self.0);
        }

        (status, Json(body)).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

pub mod health {
    pub use crate::api::routes::health::public::*;
}
