use serde::{Deserialize, Serialize};

use crate::application::agents::QueryOutcome;
use crate::application::agents::enrichment_agent::EnrichedData;
use crate::application::ports::sql_executor::Row;
use crate::domain::value_objects::AgentFlow;

#[derive(Debug, Deserialize)]
pub struct QueryRequestDto {
    pub query: String,
}

/// Flat answer object; fields a failed run never produced keep their defaults.
#[derive(Debug, Serialize)]
pub struct QueryResponseDto {
    pub success: bool,
    pub query: String,
    pub sql: Option<String>,
    pub answer: Option<String>,
    pub summary: Option<String>,
    pub insights: Vec<String>,
    pub data: Vec<Row>,
    pub row_count: usize,
    pub relevant_tables: Vec<String>,
    pub enriched_data: EnrichedData,
    pub execution_time_ms: f64,
    pub agent_flow: AgentFlow,
    pub error: Option<String>,
}

impl From<QueryOutcome> for QueryResponseDto {
    fn from(outcome: QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Answered(answer) => Self {
                success: true,
                query: answer.query,
                sql: Some(answer.sql),
                answer: answer.answer,
                summary: answer.summary,
                insights: answer.insights,
                data: answer.data,
                row_count: answer.row_count,
                relevant_tables: answer.relevant_tables,
                enriched_data: answer.enriched_data,
                execution_time_ms: answer.execution_time_ms,
                agent_flow: answer.agent_flow,
                error: None,
            },
            QueryOutcome::Failed(failure) => Self {
                success: false,
                query: failure.query,
                sql: None,
                answer: None,
                summary: None,
                insights: Vec::new(),
                data: Vec::new(),
                row_count: 0,
                relevant_tables: Vec::new(),
                enriched_data: EnrichedData::default(),
                execution_time_ms: failure.execution_time_ms,
                agent_flow: AgentFlow::retrieval_failed(),
                error: Some(failure.error),
            },
        }
    }
}
