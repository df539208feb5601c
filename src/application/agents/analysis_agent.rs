use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

use crate::application::agents::reasoning::{Agent, QueryContext, ReasoningLog};
use crate::application::agents::retrieval_agent::RetrievalOutput;
use crate::application::ports::LanguageModel;
use crate::application::ports::language_model::ChatRequest;
use crate::domain::entities::ReasoningStep;

const SAMPLE_ROWS: usize = 10;

const SYSTEM_PROMPT: &str =
    "You are a financial data analyst. Provide clear, accurate analysis of query results.";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutput {
    pub answer: String,
    pub summary: String,
    pub insights: Vec<String>,
    pub reasoning: Vec<ReasoningStep>,
}

#[derive(Debug, Clone)]
pub struct AnalysisFailure {
    pub error: String,
    pub reasoning: Vec<ReasoningStep>,
}

#[derive(Debug, Deserialize)]
struct ModelAnalysis {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    insights: Vec<Value>,
}

struct Analysis {
    answer: String,
    summary: String,
    insights: Vec<String>,
}

impl Analysis {
    fn fallback(row_count: usize) -> Self {
        Self {
            answer: format!("Query returned {} results.", row_count),
            summary: format!(
                "The SQL query successfully retrieved {} rows from the database.",
                row_count
            ),
            insights: vec!["Data retrieved successfully".to_string()],
        }
    }
}

/// Rows -> prose answer, summary and a few insights.
pub struct AnalysisAgent {
    language_model: Arc<dyn LanguageModel>,
}

impl AnalysisAgent {
    pub const NAME: &'static str = "AnalysisAgent";

    pub fn new(language_model: Arc<dyn LanguageModel>) -> Self {
        Self { language_model }
    }

    async fn analyze(&self, query: &str, retrieval: &RetrievalOutput) -> Analysis {
        let sample = retrieval.rows.head(SAMPLE_ROWS);
        let sample_json = serde_json::to_string(sample).unwrap_or_else(|_| "[]".to_string());

        let prompt = format!(
            "Analyze the following database query results and provide a clear, concise answer.

User Question: {query}

SQL Query:
{sql}

Results (showing {shown} of {total} rows):
{sample_json}

Provide:
1. A direct answer to the user's question
2. A brief summary of the findings
3. 2-3 key insights from the data

Format your response as JSON with keys: \"answer\", \"summary\", \"insights\" (array)",
            sql = retrieval.sql,
            shown = sample.len(),
            total = retrieval.row_count(),
        );

        let request = ChatRequest::new(SYSTEM_PROMPT, prompt)
            .with_temperature(0.3)
            .with_max_tokens(500)
            .json_object();

        let parsed = match self.language_model.complete(request).await {
            Ok(response) => serde_json::from_str::<ModelAnalysis>(&response.content)
                .map_err(|e| format!("unparseable analysis: {}", e)),
            Err(e) => Err(e.to_string()),
        };

        match parsed {
            Ok(analysis) => Analysis {
                answer: analysis.answer,
                summary: analysis.summary,
                insights: analysis
                    .insights
                    .into_iter()
                    .map(|insight| match insight {
                        Value::String(text) => text,
                        other => other.to_string(),
                    })
                    .collect(),
            },
            Err(e) => {
                warn!("Falling back to row-count analysis: {}", e);
                Analysis::fallback(retrieval.row_count())
            }
        }
    }
}

#[async_trait]
impl Agent for AnalysisAgent {
    type Output = Result<AnalysisOutput, AnalysisFailure>;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn execute(&self, context: &QueryContext<'_>) -> Self::Output {
        let mut reasoning = ReasoningLog::new(Self::NAME);
        reasoning.log(
            "analysis_started",
            json!({
                "query": context.query,
                "data_available": context.retrieval.is_some(),
            }),
        );

        let Some(retrieval) = context.retrieval else {
            return Err(AnalysisFailure {
                error: "No data to analyze".to_string(),
                reasoning: reasoning.into_steps(),
            });
        };

        let analysis = self.analyze(context.query, retrieval).await;

        reasoning.log(
            "analysis_completed",
            json!({
                "summary_generated": true,
                "insights_count": analysis.insights.len(),
            }),
        );

        Ok(AnalysisOutput {
            answer: analysis.answer,
            summary: analysis.summary,
            insights: analysis.insights,
            reasoning: reasoning.into_steps(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::sql_executor::QueryRows;
    use crate::domain::value_objects::GeneratedSql;
    use crate::test_support::ScriptedLanguageModel;

    fn retrieval(rows: usize) -> RetrievalOutput {
        let rows = (0..rows)
            .map(|i| {
                json!({"ticker": format!("T{}", i), "close_price": 100.0 + i as f64})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect();

        RetrievalOutput {
            sql: GeneratedSql::parse("SELECT ticker, close_price FROM market_data").unwrap(),
            rows: QueryRows::from_rows(rows),
            relevant_tables: vec!["market_data".to_string()],
            reasoning: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_uses_model_json() {
        let model = Arc::new(ScriptedLanguageModel::replying(&[
            r#"{"answer": "T0 is cheapest", "summary": "25 tickers", "insights": ["a", "b"]}"#,
        ]));
        let agent = AnalysisAgent::new(model.clone());
        let data = retrieval(25);

        let output = agent
            .execute(&QueryContext::new("cheapest stock").with_retrieval(&data))
            .await
            .unwrap();

        assert_eq!(output.answer, "T0 is cheapest");
        assert_eq!(output.insights, vec!["a", "b"]);
        assert_eq!(output.reasoning[1].step, "analysis_completed");
        assert_eq!(output.reasoning[1].details["insights_count"], 2);

        let request = &model.requests()[0];
        assert!(request.json_response);
        assert!(model.last_user_prompt().contains("showing 10 of 25 rows"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let model = Arc::new(ScriptedLanguageModel::replying(&["not json at all"]));
        let agent = AnalysisAgent::new(model);
        let data = retrieval(3);

        let output = agent
            .execute(&QueryContext::new("prices").with_retrieval(&data))
            .await
            .unwrap();

        assert_eq!(output.answer, "Query returned 3 results.");
        assert_eq!(
            output.summary,
            "The SQL query successfully retrieved 3 rows from the database."
        );
        assert_eq!(output.insights, vec!["Data retrieved successfully"]);
    }

    #[tokio::test]
    async fn test_no_retrieval_means_nothing_to_analyze() {
        let model = Arc::new(ScriptedLanguageModel::replying(&[]));
        let agent = AnalysisAgent::new(model.clone());

        let failure = agent.execute(&QueryContext::new("prices")).await.unwrap_err();

        assert_eq!(failure.error, "No data to analyze");
        assert_eq!(failure.reasoning[0].details["data_available"], false);
        assert!(model.requests().is_empty());
    }
}
