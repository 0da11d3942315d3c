//! Function style entrypoint for serverless platforms. The event is
//! dispatched through the same router the HTTP server uses, so there is
//! only one implementation of every route.
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, body::Body};
use http::Request;
use serde::{Deserialize, Serialize};
use tower::util::ServiceExt;

use crate::api::{AppState, app};
use crate::core::CorpusSource;

use super::serve::config_with;

#[derive(Debug, Default, Deserialize)]
pub struct Event {
    pub path: Option<String>,
    #[serde(rename = "httpMethod")]
    pub http_method: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvokeResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

pub async fn handle_event(app: Router, event: Event) -> Result<InvokeResponse> {
    let path = event.path.unwrap_or_else(|| "/api/chat".to_string());
    let method = event.http_method.unwrap_or_else(|| "POST".to_string());

    let mut builder = Request::builder().method(method.as_str()).uri(path);
    for (name, value) in event.headers.unwrap_or_default() {
        builder = builder.header(name, value);
    }
    let request = builder.body(Body::from(event.body.unwrap_or_default()))?;

    let response = app.oneshot(request).await?;
    let status_code = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
        .collect();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

    Ok(InvokeResponse {
        status_code,
        headers,
        body: String::from_utf8_lossy(&bytes).to_string(),
    })
}

pub async fn run(corpus: Option<CorpusSource>) -> Result<()> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let event: Event = serde_json::from_str(&input)?;

    let state = AppState::initialize(config_with(corpus)).await?;
    let response = handle_event(app(Arc::new(state)), event).await?;
    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}
