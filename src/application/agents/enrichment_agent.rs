use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::application::agents::reasoning::{Agent, QueryContext, ReasoningLog};
use crate::application::ports::filings_provider::FilingsLookup;
use crate::application::ports::market_data_provider::MarketSnapshot;
use crate::application::ports::{FilingsProvider, MarketDataProvider};
use crate::domain::entities::ReasoningStep;

const MARKET_KEYWORDS: [&str; 5] = ["stock", "ticker", "market", "price", "yahoo"];
const FILINGS_KEYWORDS: [&str; 5] = ["sec", "edgar", "filing", "10-k", "10-q"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichedData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_data: Option<MarketSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sec_data: Option<FilingsLookup>,
}

impl EnrichedData {
    pub fn is_empty(&self) -> bool {
        self.market_data.is_none() && self.sec_data.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct EnrichmentOutput {
    pub enriched_data: EnrichedData,
    pub reasoning: Vec<ReasoningStep>,
}

/// Optional third stage: attaches live market and filings data when the
/// question asks for it. Never fails the pipeline.
pub struct EnrichmentAgent {
    market_data: Arc<dyn MarketDataProvider>,
    filings: Arc<dyn FilingsProvider>,
}

impl EnrichmentAgent {
    pub const NAME: &'static str = "EnrichmentAgent";

    pub fn new(market_data: Arc<dyn MarketDataProvider>, filings: Arc<dyn FilingsProvider>) -> Self {
        Self {
            market_data,
            filings,
        }
    }

    fn mentions_any(query: &str, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| query.contains(k))
    }

    /// First `ticker` value found in the retrieved rows.
    fn extract_ticker(context: &QueryContext<'_>) -> Option<String> {
        let retrieval = context.retrieval?;
        retrieval
            .rows
            .rows
            .iter()
            .find_map(|row| row.get("ticker").and_then(value_as_identifier))
    }

    /// Company name if the rows carry one, else a ticker.
    fn extract_company_identifier(context: &QueryContext<'_>) -> Option<String> {
        let retrieval = context.retrieval?;
        retrieval.rows.rows.iter().find_map(|row| {
            row.get("name")
                .and_then(value_as_identifier)
                .or_else(|| row.get("ticker").and_then(value_as_identifier))
        })
    }
}

fn value_as_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl Agent for EnrichmentAgent {
    type Output = EnrichmentOutput;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn execute(&self, context: &QueryContext<'_>) -> Self::Output {
        let query = context.query.to_lowercase();
        let mut reasoning = ReasoningLog::new(Self::NAME);
        reasoning.log("enrichment_started", json!({ "query": query }));

        let mut enriched_data = EnrichedData::default();

        if Self::mentions_any(&query, &MARKET_KEYWORDS) {
            if let Some(ticker) = Self::extract_ticker(context) {
                match self.market_data.quote(&ticker).await {
                    Ok(snapshot) => {
                        reasoning.log(
                            "yahoo_finance_enrichment",
                            json!({ "ticker": ticker, "data_fetched": true }),
                        );
                        enriched_data.market_data = Some(snapshot);
                    }
                    Err(e) => {
                        warn!("Market data lookup for {} failed: {}", ticker, e);
                        reasoning.log("yahoo_finance_error", e.to_string());
                    }
                }
            } else {
                debug!("Market keywords present but no ticker in the result rows");
            }
        }

        if Self::mentions_any(&query, &FILINGS_KEYWORDS) {
            if let Some(company) = Self::extract_company_identifier(context) {
                match self.filings.search_company(&company).await {
                    Ok(Some(lookup)) => {
                        reasoning.log(
                            "sec_edgar_enrichment",
                            json!({ "company": company, "data_fetched": true }),
                        );
                        enriched_data.sec_data = Some(lookup);
                    }
                    Ok(None) => debug!("No filings data for {}", company),
                    Err(e) => {
                        warn!("Filings lookup for {} failed: {}", company, e);
                        reasoning.log("sec_edgar_error", e.to_string());
                    }
                }
            }
        }

        if enriched_data.is_empty() {
            reasoning.log("no_enrichment_needed", "Query does not require external data");
        }

        EnrichmentOutput {
            enriched_data,
            reasoning: reasoning.into_steps(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::agents::retrieval_agent::RetrievalOutput;
    use crate::application::ports::sql_executor::QueryRows;
    use crate::domain::value_objects::GeneratedSql;
    use crate::test_support::{FakeFilings, FakeMarketData};

    fn retrieval(rows: Vec<Value>) -> RetrievalOutput {
        RetrievalOutput {
            sql: GeneratedSql::parse("SELECT name, ticker FROM companies").unwrap(),
            rows: QueryRows::from_rows(
                rows.into_iter()
                    .filter_map(|r| r.as_object().cloned())
                    .collect(),
            ),
            relevant_tables: vec!["companies".to_string()],
            reasoning: Vec::new(),
        }
    }

    fn steps(output: &EnrichmentOutput) -> Vec<&str> {
        output.reasoning.iter().map(|s| s.step.as_str()).collect()
    }

    #[tokio::test]
    async fn test_price_question_fetches_quote() {
        let agent = EnrichmentAgent::new(
            Arc::new(FakeMarketData::default().with_quote("AAPL", 189.5)),
            Arc::new(FakeFilings::unconfigured()),
        );
        let data = retrieval(vec![json!({"name": "Apple Inc.", "ticker": "AAPL"})]);

        let output = agent
            .execute(&QueryContext::new("What is the Stock Price of Apple?").with_retrieval(&data))
            .await;

        let snapshot = output.enriched_data.market_data.as_ref().unwrap();
        assert_eq!(snapshot.ticker, "AAPL");
        assert_eq!(snapshot.current_price, Some(189.5));
        assert!(output.enriched_data.sec_data.is_none());
        assert_eq!(steps(&output), vec!["enrichment_started", "yahoo_finance_enrichment"]);
    }

    #[tokio::test]
    async fn test_filings_prefer_company_name() {
        let filings = Arc::new(FakeFilings::found(json!({"hits": 3})));
        let agent = EnrichmentAgent::new(Arc::new(FakeMarketData::default()), filings.clone());
        let data = retrieval(vec![json!({"name": "Apple Inc.", "ticker": "AAPL"})]);

        let output = agent
            .execute(&QueryContext::new("latest 10-K filing").with_retrieval(&data))
            .await;

        assert_eq!(*filings.lookups.lock().unwrap(), vec!["Apple Inc."]);
        let sec = output.enriched_data.sec_data.unwrap();
        assert_eq!(sec.search_results, json!({"hits": 3}));
    }

    #[tokio::test]
    async fn test_provider_errors_are_skipped() {
        let agent = EnrichmentAgent::new(
            Arc::new(FakeMarketData::default()),
            Arc::new(FakeFilings::failing("timeout")),
        );
        let data = retrieval(vec![json!({"ticker": "ZZZZ"})]);

        let output = agent
            .execute(&QueryContext::new("market price and sec filings").with_retrieval(&data))
            .await;

        assert!(output.enriched_data.is_empty());
        assert_eq!(
            steps(&output),
            vec![
                "enrichment_started",
                "yahoo_finance_error",
                "sec_edgar_error",
                "no_enrichment_needed"
            ]
        );
    }

    #[tokio::test]
    async fn test_plain_question_needs_no_enrichment() {
        let agent = EnrichmentAgent::new(
            Arc::new(FakeMarketData::default().with_quote("AAPL", 1.0)),
            Arc::new(FakeFilings::found(json!({}))),
        );
        let data = retrieval(vec![json!({"name": "Apple Inc.", "ticker": "AAPL"})]);

        let output = agent
            .execute(&QueryContext::new("How many companies are there?").with_retrieval(&data))
            .await;

        assert!(output.enriched_data.is_empty());
        assert_eq!(steps(&output), vec!["enrichment_started", "no_enrichment_needed"]);
        assert_eq!(serde_json::to_value(&output.enriched_data).unwrap(), json!({}));
    }
}
