//! In-memory fakes for the port and repository traits, shared by unit tests.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use pgvector::Vector;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{
    EmbeddingProvider, FilingsProvider, LanguageModel, MarketDataProvider, SchemaCatalog,
    SqlExecutor,
    embedding_provider::{
        BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProviderError, EmbeddingRequest,
        EmbeddingResponse,
    },
    filings_provider::{FilingsError, FilingsLookup},
    language_model::{ChatRequest, ChatResponse, LanguageModelError},
    market_data_provider::{
        CompanyProfile, MarketDataError, MarketSnapshot, PriceBar, QuarterlyFundamentals,
    },
    schema_catalog::{ColumnInfo, SchemaCatalogError, TableInfo},
    sql_executor::{QueryRows, Row, SqlExecutionError},
};
use crate::domain::entities::{
    Company, FinancialStatement, ForeignKey, MarketData, PerformanceMetric, PortfolioCompany,
    QueryLog,
};
use crate::domain::repositories::{
    FinancialDataRepository, QueryLogRepository,
    financial_data_repository::{FinancialDataRepositoryError, TableCounts},
    query_log_repository::QueryLogRepositoryError,
};
use crate::domain::value_objects::GeneratedSql;

/// Embeds text as a normalized bag of the given vocabulary words.
pub struct KeywordEmbeddingProvider {
    vocabulary: Vec<String>,
    failing: bool,
    batch_delay: Option<Duration>,
}

impl KeywordEmbeddingProvider {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| w.to_string()).collect(),
            failing: false,
            batch_delay: None,
        }
    }

    /// Sleeps before answering each batch, like a remote embedding API.
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = Some(delay);
        self
    }

    pub fn financial() -> Self {
        Self::new(&[
            "companies",
            "company",
            "ticker",
            "name",
            "sector",
            "market",
            "data",
            "price",
            "close",
            "financial",
            "statements",
            "revenue",
            "portfolio",
            "performance",
            "metrics",
            "arr",
        ])
    }

    pub fn failing() -> Self {
        Self {
            vocabulary: vec!["unused".to_string()],
            failing: true,
            batch_delay: None,
        }
    }

    pub fn embed(&self, text: &str) -> Vector {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let mut values: Vec<f32> = self
            .vocabulary
            .iter()
            .map(|word| tokens.iter().filter(|t| *t == word).count() as f32)
            .collect();

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            values.iter_mut().for_each(|v| *v /= norm);
        }
        Vector::from(values)
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbeddingProvider {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        if self.failing {
            return Err(EmbeddingProviderError::ServiceUnavailable);
        }
        Ok(EmbeddingResponse {
            embedding: self.embed(&request.text),
            model_name: self.model_name(),
            token_count: None,
        })
    }

    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        if let Some(delay) = self.batch_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(EmbeddingProviderError::ServiceUnavailable);
        }
        Ok(BatchEmbeddingResponse {
            embeddings: request.texts.iter().map(|t| self.embed(t)).collect(),
            model_name: self.model_name(),
            total_tokens: None,
        })
    }

    fn model_name(&self) -> String {
        "keyword-test".to_string()
    }

    fn embedding_dimension(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Replays canned completions in order and records every request.
pub struct ScriptedLanguageModel {
    responses: Mutex<VecDeque<Result<String, LanguageModelError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLanguageModel {
    pub fn new(responses: Vec<Result<String, LanguageModelError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(contents: &[&str]) -> Self {
        Self::new(contents.iter().map(|c| Ok(c.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_user_prompt(&self) -> String {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|r| r.messages.last())
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLanguageModel {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LanguageModelError> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LanguageModelError::ServiceUnavailable));

        next.map(|content| ChatResponse {
            content,
            model: "scripted".to_string(),
            total_tokens: None,
        })
    }

    fn model_name(&self) -> String {
        "scripted".to_string()
    }
}

pub struct StaticSchemaCatalog {
    tables: Vec<TableInfo>,
}

impl StaticSchemaCatalog {
    pub fn new(tables: Vec<TableInfo>) -> Self {
        Self { tables }
    }

    /// companies(id, name, ticker, sector) and market_data(id, ticker, close_price)
    /// plus financial_statements(id, company_id, revenue) -> companies.id
    pub fn financial() -> Self {
        let column = |name: &str, data_type: &str| ColumnInfo {
            name: name.to_string(),
            data_type: data_type.to_string(),
        };

        Self::new(vec![
            TableInfo {
                name: "companies".to_string(),
                columns: vec![
                    column("id", "integer"),
                    column("name", "character varying"),
                    column("ticker", "character varying"),
                    column("sector", "character varying"),
                ],
                foreign_keys: Vec::new(),
            },
            TableInfo {
                name: "financial_statements".to_string(),
                columns: vec![
                    column("id", "integer"),
                    column("company_id", "integer"),
                    column("revenue", "double precision"),
                ],
                foreign_keys: vec![ForeignKey {
                    constrained_columns: vec!["company_id".to_string()],
                    referred_table: "companies".to_string(),
                    referred_columns: vec!["id".to_string()],
                }],
            },
            TableInfo {
                name: "market_data".to_string(),
                columns: vec![
                    column("id", "integer"),
                    column("ticker", "character varying"),
                    column("close_price", "double precision"),
                ],
                foreign_keys: Vec::new(),
            },
        ])
    }
}

#[async_trait]
impl SchemaCatalog for StaticSchemaCatalog {
    async fn list_tables(&self) -> Result<Vec<TableInfo>, SchemaCatalogError> {
        Ok(self.tables.clone())
    }
}

pub struct FakeSqlExecutor {
    result: Result<Vec<Row>, String>,
    executed: Mutex<Vec<String>>,
}

impl FakeSqlExecutor {
    pub fn returning(rows: Vec<Value>) -> Self {
        Self {
            result: Ok(rows
                .into_iter()
                .filter_map(|v| v.as_object().cloned())
                .collect()),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlExecutor for FakeSqlExecutor {
    async fn execute_read_only(&self, sql: &GeneratedSql) -> Result<QueryRows, SqlExecutionError> {
        self.executed.lock().unwrap().push(sql.to_string());
        match &self.result {
            Ok(rows) => Ok(QueryRows::from_rows(rows.clone())),
            Err(message) => Err(SqlExecutionError::ExecutionFailed(message.clone())),
        }
    }

    async fn ping(&self) -> Result<(), SqlExecutionError> {
        match &self.result {
            Ok(_) => Ok(()),
            Err(message) => Err(SqlExecutionError::ConnectionError(message.clone())),
        }
    }
}

#[derive(Default)]
pub struct InMemoryQueryLogRepository {
    logs: Mutex<Vec<QueryLog>>,
    failing: bool,
}

impl InMemoryQueryLogRepository {
    pub fn failing() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn saved(&self) -> Vec<QueryLog> {
        self.logs.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryLogRepository for InMemoryQueryLogRepository {
    async fn save(&self, log: &QueryLog) -> Result<(), QueryLogRepositoryError> {
        if self.failing {
            return Err(QueryLogRepositoryError::DatabaseError(
                "connection refused".to_string(),
            ));
        }
        let mut logs = self.logs.lock().unwrap();
        let id = logs.len() as i32 + 1;
        logs.push(QueryLog::from_database(
            id,
            log.user_query().to_string(),
            log.generated_sql().map(str::to_string),
            log.sql_result().map(str::to_string),
            log.final_answer().map(str::to_string),
            log.context_used().map(str::to_string),
            log.agent_reasoning().map(str::to_string),
            log.execution_time_ms(),
            log.is_success(),
            log.error_message().map(str::to_string),
            log.created_at(),
        ));
        Ok(())
    }

    async fn find_recent(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<QueryLog>, QueryLogRepositoryError> {
        let logs = self.logs.lock().unwrap();
        Ok(logs
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, QueryLogRepositoryError> {
        Ok(self.logs.lock().unwrap().len() as i64)
    }

    async fn count_successful(&self) -> Result<i64, QueryLogRepositoryError> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.is_success())
            .count() as i64)
    }
}

#[derive(Default)]
pub struct FakeMarketData {
    pub quotes: HashMap<String, f64>,
    pub histories: HashMap<String, Vec<PriceBar>>,
    pub fundamentals: HashMap<String, Vec<QuarterlyFundamentals>>,
}

impl FakeMarketData {
    pub fn with_quote(mut self, ticker: &str, price: f64) -> Self {
        self.quotes.insert(ticker.to_string(), price);
        self
    }

    pub fn with_history(mut self, ticker: &str, closes: &[f64]) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar {
                date: start + chrono::Days::new(i as u64),
                open: Some(*close),
                high: Some(*close),
                low: Some(*close),
                close: Some(*close),
                adj_close: Some(*close),
                volume: Some(1_000),
            })
            .collect();
        self.histories.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_fundamentals(mut self, ticker: &str, quarters: Vec<QuarterlyFundamentals>) -> Self {
        self.fundamentals.insert(ticker.to_string(), quarters);
        self
    }
}

#[async_trait]
impl MarketDataProvider for FakeMarketData {
    async fn quote(&self, ticker: &str) -> Result<MarketSnapshot, MarketDataError> {
        let price = self
            .quotes
            .get(ticker)
            .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))?;
        Ok(MarketSnapshot {
            ticker: ticker.to_string(),
            current_price: Some(*price),
            market_cap: None,
            pe_ratio: None,
            dividend_yield: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
            volume: None,
            fetched_at: Utc::now(),
        })
    }

    async fn company_profile(&self, ticker: &str) -> Result<CompanyProfile, MarketDataError> {
        if !self.histories.contains_key(ticker) {
            return Err(MarketDataError::NotFound(ticker.to_string()));
        }
        Ok(CompanyProfile {
            ticker: ticker.to_string(),
            name: Some(format!("{} Holdings", ticker)),
            sector: Some("Technology".to_string()),
            industry: None,
            description: None,
        })
    }

    async fn daily_history(
        &self,
        ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        self.histories
            .get(ticker)
            .cloned()
            .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))
    }

    async fn quarterly_fundamentals(
        &self,
        ticker: &str,
    ) -> Result<Vec<QuarterlyFundamentals>, MarketDataError> {
        Ok(self.fundamentals.get(ticker).cloned().unwrap_or_default())
    }
}

pub struct FakeFilings {
    pub result: Result<Option<Value>, String>,
    pub lookups: Mutex<Vec<String>>,
}

impl FakeFilings {
    pub fn found(results: Value) -> Self {
        Self {
            result: Ok(Some(results)),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            result: Ok(None),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            lookups: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl FilingsProvider for FakeFilings {
    async fn search_company(
        &self,
        identifier: &str,
    ) -> Result<Option<FilingsLookup>, FilingsError> {
        self.lookups.lock().unwrap().push(identifier.to_string());
        match &self.result {
            Ok(Some(results)) => Ok(Some(FilingsLookup {
                company: identifier.to_string(),
                search_results: results.clone(),
                fetched_at: Utc::now(),
            })),
            Ok(None) => Ok(None),
            Err(message) => Err(FilingsError::NetworkError(message.clone())),
        }
    }
}

#[derive(Default)]
pub struct InMemoryFinancialRepository {
    pub companies: Mutex<Vec<Company>>,
    pub statements: Mutex<Vec<FinancialStatement>>,
    pub portfolios: Mutex<Vec<PortfolioCompany>>,
    pub metrics: Mutex<Vec<PerformanceMetric>>,
    pub market_data: Mutex<Vec<MarketData>>,
}

impl InMemoryFinancialRepository {
    pub fn with_portfolios(count: usize) -> Self {
        let repo = Self::default();
        {
            let mut portfolios = repo.portfolios.lock().unwrap();
            for i in 0..count {
                portfolios.push(PortfolioCompany::new(
                    i as i32 + 1,
                    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                ));
            }
        }
        repo
    }
}

#[async_trait]
impl FinancialDataRepository for InMemoryFinancialRepository {
    async fn upsert_company(&self, company: &Company) -> Result<i32, FinancialDataRepositoryError> {
        let mut companies = self.companies.lock().unwrap();
        let existing = companies.iter().position(|c| match (c.ticker(), company.ticker()) {
            (Some(a), Some(b)) => a == b,
            _ => c.name() == company.name(),
        });
        if let Some(index) = existing {
            return Ok(index as i32 + 1);
        }
        companies.push(company.clone());
        Ok(companies.len() as i32)
    }

    async fn find_company_id_by_name(
        &self,
        name: &str,
    ) -> Result<Option<i32>, FinancialDataRepositoryError> {
        Ok(self
            .companies
            .lock()
            .unwrap()
            .iter()
            .position(|c| c.name() == name)
            .map(|i| i as i32 + 1))
    }

    async fn find_portfolio_id_by_company(
        &self,
        company_id: i32,
    ) -> Result<Option<i32>, FinancialDataRepositoryError> {
        Ok(self
            .portfolios
            .lock()
            .unwrap()
            .iter()
            .position(|p| p.company_id == company_id)
            .map(|i| i as i32 + 1))
    }

    async fn list_portfolio_company_ids(&self) -> Result<Vec<i32>, FinancialDataRepositoryError> {
        let count = self.portfolios.lock().unwrap().len();
        Ok((1..=count as i32).collect())
    }

    async fn insert_financial_statements(
        &self,
        statements: &[FinancialStatement],
    ) -> Result<usize, FinancialDataRepositoryError> {
        self.statements.lock().unwrap().extend_from_slice(statements);
        Ok(statements.len())
    }

    async fn insert_portfolio_companies(
        &self,
        portfolios: &[PortfolioCompany],
    ) -> Result<usize, FinancialDataRepositoryError> {
        self.portfolios.lock().unwrap().extend_from_slice(portfolios);
        Ok(portfolios.len())
    }

    async fn insert_performance_metrics(
        &self,
        metrics: &[PerformanceMetric],
    ) -> Result<usize, FinancialDataRepositoryError> {
        self.metrics.lock().unwrap().extend_from_slice(metrics);
        Ok(metrics.len())
    }

    async fn insert_market_data(
        &self,
        bars: &[MarketData],
    ) -> Result<usize, FinancialDataRepositoryError> {
        self.market_data.lock().unwrap().extend_from_slice(bars);
        Ok(bars.len())
    }

    async fn table_counts(&self) -> Result<TableCounts, FinancialDataRepositoryError> {
        Ok(TableCounts {
            companies: self.companies.lock().unwrap().len() as i64,
            financial_statements: self.statements.lock().unwrap().len() as i64,
            portfolio_companies: self.portfolios.lock().unwrap().len() as i64,
            performance_metrics: self.metrics.lock().unwrap().len() as i64,
            market_data: self.market_data.lock().unwrap().len() as i64,
        })
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", address)
}
