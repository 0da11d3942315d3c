//! Public types for the health API
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::CorpusSource;

#[derive(Serialize)]
pub struct CorpusStatus {
    pub source: CorpusSource,
    pub chars: usize,
    pub built_at: DateTime<Utc>,
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub corpus: CorpusStatus,
}

impl CorpusStatus {
    pub fn new(source: CorpusSource, chars: usize, built_at: DateTime<Utc>, error: Option<&str>) -> Self {
        Self {
            source,
            chars,
            built_at,
            error: error.map(str::to_string),
        }
    }
}
