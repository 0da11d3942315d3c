//! Public types for the chat API
use http::{HeaderMap, header};
use serde_json::Value;

use crate::ai::chat::History;
pub use crate::ai::chat::ChatTurn as ChatResponse;

/// A chat request as sent by the browser.
///
/// Parsing is forgiving: a body without a JSON content type, a body
/// that isn't JSON, a `message` that isn't a string or a `history`
/// that isn't an array fall back to their empty values and are left
/// for validation to reject.
#[derive(Debug, Default)]
pub struct ChatRequest {
    pub message: String,
    pub history: History,
}

impl ChatRequest {
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return Self::default();
        };
        let message = obj
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let history = History::from_value(obj.remove("history"));
        Self { message, history }
    }

    pub fn from_slice(body: &[u8]) -> Self {
        serde_json::from_slice::<Value>(body)
            .map(Self::from_value)
            .unwrap_or_default()
    }

    /// Only bodies declared as JSON are parsed.
    pub fn from_request(headers: &HeaderMap, body: &[u8]) -> Self {
        if is_json(headers) {
            Self::from_slice(body)
        } else {
            Self::default()
        }
    }
}

/// `application/json` or an `application/*+json` type, parameters ignored
fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}
