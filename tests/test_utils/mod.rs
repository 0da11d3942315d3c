//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body};
use serde_json::{Value, json};

use insmart_qa::api::{AppState, app};
use insmart_qa::core::{AppConfig, CorpusSource, CrawlConfig};
use insmart_qa::corpus::Corpus;
use insmart_qa::openai::CompletionClient;

pub const DEPLOYMENT: &str = "gpt-4.1-nano";
pub const COMPLETION_PATH: &str = "/openai/deployments/gpt-4.1-nano/chat/completions";

/// Config pointing the completion client at `llm_api_hostname`,
/// usually a `mockito` server.
pub fn test_config(llm_api_hostname: &str) -> AppConfig {
    AppConfig {
        llm_api_hostname: llm_api_hostname.to_string(),
        llm_api_key: String::from("test-api-key"),
        llm_deployment: String::from(DEPLOYMENT),
        llm_api_version: String::from("2025-01-01-preview"),
        llm_temperature: 0.5,
        llm_max_tokens: 800,
        llm_timeout: Duration::from_secs(5),
        home_url: String::from("https://insmart.cite.hku.hk/"),
        corpus_source: CorpusSource::Bundled,
        crawl: CrawlConfig {
            max_pages: 50,
            per_page_chars: 5000,
            total_chars: 30000,
            fetch_timeout: Duration::from_secs(5),
        },
        web_ui_path: format!("{}/web-ui", env!("CARGO_MANIFEST_DIR")),
    }
}

/// Creates a test application router around an explicit corpus.
pub fn test_app_with_corpus(llm_api_hostname: &str, corpus: Corpus) -> Router {
    let config = test_config(llm_api_hostname);
    let client = CompletionClient::new(&config);
    let app_state = AppState::new(config, corpus, Arc::new(client)).expect("Failed to build state");
    app(Arc::new(app_state))
}

/// Creates a test application router with the bundled corpus.
pub fn test_app(llm_api_hostname: &str) -> Router {
    test_app_with_corpus(llm_api_hostname, Corpus::bundled())
}

/// A chat completion response wrapping `content`
pub fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1694268190,
        "model": DEPLOYMENT,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub async fn body_to_json(body: Body) -> Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not JSON")
}
