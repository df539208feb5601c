use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::application::agents::analysis_agent::AnalysisAgent;
use crate::application::agents::enrichment_agent::{EnrichedData, EnrichmentAgent};
use crate::application::agents::reasoning::{Agent, QueryContext};
use crate::application::agents::retrieval_agent::RetrievalAgent;
use crate::application::ports::sql_executor::Row;
use crate::domain::entities::{QueryLog, ReasoningStep};
use crate::domain::repositories::QueryLogRepository;
use crate::domain::value_objects::{AgentFlow, StageStatus};

const LOGGED_RESULT_ROWS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    pub query: String,
    pub sql: String,
    pub answer: Option<String>,
    pub summary: Option<String>,
    pub insights: Vec<String>,
    pub data: Vec<Row>,
    pub row_count: usize,
    pub relevant_tables: Vec<String>,
    pub enriched_data: EnrichedData,
    pub execution_time_ms: f64,
    pub agent_flow: AgentFlow,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryFailure {
    pub query: String,
    pub error: String,
    pub execution_time_ms: f64,
}

#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Answered(QueryAnswer),
    Failed(QueryFailure),
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Answered(_))
    }
}

/// Runs retrieval, analysis and enrichment in order and records one audit row per question.
pub struct AgentOrchestrator {
    retrieval: Arc<RetrievalAgent>,
    analysis: Arc<AnalysisAgent>,
    enrichment: Arc<EnrichmentAgent>,
    query_log_repository: Arc<dyn QueryLogRepository>,
}

impl AgentOrchestrator {
    pub fn new(
        retrieval: Arc<RetrievalAgent>,
        analysis: Arc<AnalysisAgent>,
        enrichment: Arc<EnrichmentAgent>,
        query_log_repository: Arc<dyn QueryLogRepository>,
    ) -> Self {
        Self {
            retrieval,
            analysis,
            enrichment,
            query_log_repository,
        }
    }

    pub async fn process_query(&self, user_query: &str) -> QueryOutcome {
        let context = QueryContext::new(user_query);
        info!("Processing query: {}", user_query);

        let retrieval = match self.retrieval.execute(&context).await {
            Ok(retrieval) => retrieval,
            Err(failure) => {
                warn!("{} failed: {}", self.retrieval.name(), failure.error);
                let execution_time_ms = context.elapsed_ms();
                let log = QueryLog::failed(
                    user_query.to_string(),
                    failure.sql.as_ref().map(|sql| sql.to_string()),
                    failure.error.clone(),
                    Some(combine_reasoning(&[&failure.reasoning])),
                    execution_time_ms,
                );
                self.record(&log).await;

                return QueryOutcome::Failed(QueryFailure {
                    query: user_query.to_string(),
                    error: failure.error,
                    execution_time_ms,
                });
            }
        };

        let context = context.with_retrieval(&retrieval);
        let analysis = self.analysis.execute(&context).await;
        let enrichment = self.enrichment.execute(&context).await;

        let execution_time_ms = context.elapsed_ms();

        let (answer, summary, insights, analysis_status, analysis_reasoning) = match analysis {
            Ok(output) => (
                Some(output.answer),
                Some(output.summary),
                output.insights,
                StageStatus::Completed,
                output.reasoning,
            ),
            Err(failure) => {
                warn!("{} failed: {}", self.analysis.name(), failure.error);
                (None, None, Vec::new(), StageStatus::Failed, failure.reasoning)
            }
        };

        let agent_flow = AgentFlow {
            retrieval: StageStatus::Completed,
            analysis: analysis_status,
            enrichment: if enrichment.enriched_data.is_empty() {
                StageStatus::Skipped
            } else {
                StageStatus::Completed
            },
        };

        let log = QueryLog::succeeded(
            user_query.to_string(),
            Some(retrieval.sql.to_string()),
            serde_json::to_string(retrieval.rows.head(LOGGED_RESULT_ROWS)).ok(),
            answer.clone(),
            serde_json::to_string(&retrieval.relevant_tables).ok(),
            Some(combine_reasoning(&[
                &retrieval.reasoning,
                &analysis_reasoning,
                &enrichment.reasoning,
            ])),
            execution_time_ms,
        );
        self.record(&log).await;

        info!(
            "Answered query in {:.1}ms ({} rows)",
            execution_time_ms,
            retrieval.row_count()
        );

        QueryOutcome::Answered(QueryAnswer {
            query: user_query.to_string(),
            sql: retrieval.sql.to_string(),
            answer,
            summary,
            insights,
            row_count: retrieval.row_count(),
            data: retrieval.rows.rows,
            relevant_tables: retrieval.relevant_tables,
            enriched_data: enrichment.enriched_data,
            execution_time_ms,
            agent_flow,
        })
    }

    async fn record(&self, log: &QueryLog) {
        if let Err(e) = self.query_log_repository.save(log).await {
            error!("Error logging query: {}", e);
        }
    }
}

fn combine_reasoning(stages: &[&[ReasoningStep]]) -> String {
    let all: Vec<&ReasoningStep> = stages.iter().flat_map(|steps| steps.iter()).collect();
    serde_json::to_string_pretty(&all).unwrap_or_else(|_| "[]".to_string())
}
