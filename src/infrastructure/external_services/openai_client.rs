use async_trait::async_trait;
use pgvector::Vector;
use reqwest::{Client, Error as ReqwestError, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
    EmbeddingRequest, EmbeddingResponse,
};
use crate::application::ports::language_model::{
    ChatMessage, ChatRequest, ChatResponse, LanguageModel, LanguageModelError,
};
use crate::config::LlmConfig;

#[derive(Debug, Clone)]
pub struct OpenAiClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_factor: f64,
    /// Delay before the first retry; later retries scale it by `backoff_factor`.
    pub retry_base_delay: Duration,
}

impl OpenAiClientConfig {
    pub fn from_llm_config(config: &LlmConfig, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            embedding_dimension: config.embedding_dimension,
            max_retries: config.max_retries,
            timeout_secs: config.timeout_secs,
            backoff_factor: config.backoff_factor,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("HTTP {status}: {body}")]
    StatusError { status: StatusCode, body: String },
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl OpenAiError {
    fn is_retryable(&self) -> bool {
        match self {
            OpenAiError::RequestError(_) => true,
            OpenAiError::StatusError { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            OpenAiError::ParseError(_) => false,
        }
    }
}

#[derive(Serialize)]
struct EmbeddingsRequestBody<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponseBody {
    data: Vec<EmbeddingDatum>,
    model: String,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    choices: Vec<ChatChoice>,
    model: String,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

/// HTTP client for an OpenAI-compatible API with retry and exponential backoff.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: OpenAiClientConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiClientConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiClientConfig {
        &self.config
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, OpenAiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.execute_request(path, body).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempts <= self.config.max_retries => {
                    let backoff_time = self
                        .config
                        .retry_base_delay
                        .mul_f64(self.config.backoff_factor.powi(attempts as i32 - 1));
                    warn!(
                        "{} failed (attempt {}), retrying in {:?}: {}",
                        path, attempts, backoff_time, e
                    );
                    tokio::time::sleep(backoff_time).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute_request<B, R>(&self, path: &str, body: &B) -> Result<R, OpenAiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| OpenAiError::RequestError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenAiError::StatusError { status, body });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| OpenAiError::ParseError(e.to_string()))
    }

    pub async fn embed(&self, texts: &[String]) -> Result<BatchEmbeddingResponse, OpenAiError> {
        let body = EmbeddingsRequestBody {
            model: &self.config.embedding_model,
            input: texts,
        };

        let mut response: EmbeddingsResponseBody = self.post_json("/embeddings", &body).await?;
        response.data.sort_by_key(|datum| datum.index);

        debug!("Embedded {} texts with {}", response.data.len(), response.model);

        Ok(BatchEmbeddingResponse {
            embeddings: response
                .data
                .into_iter()
                .map(|datum| Vector::from(datum.embedding))
                .collect(),
            model_name: response.model,
            total_tokens: response.usage.map(|u| u.total_tokens as i32),
        })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponseBody, OpenAiError> {
        let body = ChatRequestBody {
            model: &self.config.chat_model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        self.post_json("/chat/completions", &body).await
    }
}

fn embedding_error(e: OpenAiError) -> EmbeddingProviderError {
    match e {
        OpenAiError::RequestError(msg) => EmbeddingProviderError::NetworkError(msg),
        OpenAiError::StatusError { status, .. } if status == StatusCode::TOO_MANY_REQUESTS => {
            EmbeddingProviderError::RateLimitExceeded
        }
        OpenAiError::StatusError { status, .. } if status.is_server_error() => {
            EmbeddingProviderError::ServiceUnavailable
        }
        other => EmbeddingProviderError::ApiError(other.to_string()),
    }
}

fn language_model_error(e: OpenAiError) -> LanguageModelError {
    match e {
        OpenAiError::RequestError(msg) => LanguageModelError::NetworkError(msg),
        OpenAiError::StatusError { status, .. } if status == StatusCode::TOO_MANY_REQUESTS => {
            LanguageModelError::RateLimitExceeded
        }
        OpenAiError::StatusError { status, .. } if status.is_server_error() => {
            LanguageModelError::ServiceUnavailable
        }
        other => LanguageModelError::ApiError(other.to_string()),
    }
}

// Adapters implementing the application ports
pub struct OpenAiEmbeddingProvider {
    client: OpenAiClient,
}

impl OpenAiEmbeddingProvider {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        if request.text.trim().is_empty() {
            return Err(EmbeddingProviderError::InvalidInput(
                "Text cannot be empty".to_string(),
            ));
        }

        let mut response = self
            .client
            .embed(&[request.text])
            .await
            .map_err(embedding_error)?;

        let embedding = response.embeddings.pop().ok_or_else(|| {
            EmbeddingProviderError::ApiError("No embeddings returned".to_string())
        })?;

        Ok(EmbeddingResponse {
            embedding,
            model_name: response.model_name,
            token_count: response.total_tokens,
        })
    }

    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        if request.texts.is_empty() {
            return Ok(BatchEmbeddingResponse {
                embeddings: Vec::new(),
                model_name: self.model_name(),
                total_tokens: Some(0),
            });
        }

        self.client
            .embed(&request.texts)
            .await
            .map_err(embedding_error)
    }

    fn model_name(&self) -> String {
        self.client.config().embedding_model.clone()
    }

    fn embedding_dimension(&self) -> usize {
        self.client.config().embedding_dimension
    }
}

pub struct OpenAiLanguageModel {
    client: OpenAiClient,
}

impl OpenAiLanguageModel {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LanguageModel for OpenAiLanguageModel {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LanguageModelError> {
        let response = self
            .client
            .chat(&request)
            .await
            .map_err(language_model_error)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LanguageModelError::EmptyResponse)?;

        Ok(ChatResponse {
            content: content.trim().to_string(),
            model: response.model,
            total_tokens: response.usage.map(|u| u.total_tokens),
        })
    }

    fn model_name(&self) -> String {
        self.client.config().chat_model.clone()
    }
}
