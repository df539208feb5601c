use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Error as ReqwestError};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::application::ports::FilingsProvider;
use crate::application::ports::filings_provider::{FilingsError, FilingsLookup};

/// EDGAR company search. Without an API key every lookup is a no-op,
/// since SEC requires a contact string in the User-Agent.
#[derive(Debug, Clone)]
pub struct SecEdgarClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SecEdgarClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl FilingsProvider for SecEdgarClient {
    async fn search_company(&self, identifier: &str) -> Result<Option<FilingsLookup>, FilingsError> {
        let Some(api_key) = &self.api_key else {
            debug!("SEC EDGAR lookup skipped, no API key configured");
            return Ok(None);
        };

        let response = self
            .client
            .get(format!("{}/cgi-bin/browse-edgar", self.base_url))
            .header(reqwest::header::USER_AGENT, format!("FinQuery {}", api_key))
            .query(&[("company", identifier), ("output", "json")])
            .send()
            .await
            .map_err(|e| FilingsError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!("SEC EDGAR returned {} for {}", status, identifier);
            return Ok(None);
        }

        let search_results = response
            .json::<Value>()
            .await
            .map_err(|e| FilingsError::ApiError(format!("Unexpected EDGAR response: {}", e)))?;

        Ok(Some(FilingsLookup {
            company: identifier.to_string(),
            search_results,
            fetched_at: Utc::now(),
        }))
    }
}
