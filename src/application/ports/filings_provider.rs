use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum FilingsError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilingsLookup {
    pub company: String,
    pub search_results: Value,
    pub fetched_at: DateTime<Utc>,
}

#[async_trait]
pub trait FilingsProvider: Send + Sync {
    /// `Ok(None)` when the provider is not configured or found nothing usable.
    async fn search_company(&self, identifier: &str)
    -> Result<Option<FilingsLookup>, FilingsError>;
}
