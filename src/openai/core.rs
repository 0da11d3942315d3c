use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ai::chat::Entry;
use crate::core::AppConfig;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    /// The request never got a response (DNS, connect, timeout, ...)
    #[error("{0}")]
    Unreachable(String),
    /// The completion API answered with a non-success status
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    /// A success status but not a chat completion envelope
    #[error("{0}")]
    InvalidResponse(String),
}

/// Anything that can turn a list of chat messages into the raw text
/// of the next assistant message. Exactly one upstream call per
/// invocation, no retries.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, messages: &[Entry]) -> Result<String, CompletionError>;
}

/// Builds the Azure style deployment URL used by the HKU gateway.
pub fn completion_url(api_hostname: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        api_hostname.trim_end_matches("/"),
        deployment,
        api_version
    )
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [Entry],
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
}

/// Client for an OpenAI compatible chat completion deployment.
pub struct CompletionClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    deployment: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl CompletionClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: completion_url(
                &config.llm_api_hostname,
                &config.llm_deployment,
                &config.llm_api_version,
            ),
            api_key: config.llm_api_key.clone(),
            deployment: config.llm_deployment.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout: config.llm_timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Pulls `choices[0].message.content` out of a completion
/// response. A null or missing `content` is an empty completion, not
/// an error.
pub fn completion_content(resp: &Value) -> Result<String, CompletionError> {
    let message = resp["choices"][0]
        .get("message")
        .ok_or_else(|| CompletionError::InvalidResponse(format!("No message received: {}", resp)))?;

    Ok(message["content"].as_str().unwrap_or_default().to_string())
}

#[async_trait]
impl Completion for CompletionClient {
    async fn complete(&self, messages: &[Entry]) -> Result<String, CompletionError> {
        let payload = CompletionRequest {
            messages,
            model: &self.deployment,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CompletionError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::warn!("Failed to read completion error body: {}", e);
                String::new()
            });
            tracing::error!("Completion API returned {}: {}", status, body);
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let resp: Value = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        completion_content(&resp)
    }
}
