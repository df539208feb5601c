use serde::{Deserialize, Serialize};

use crate::application::use_cases::get_query_history::GetQueryHistoryResponse;
use crate::domain::entities::QueryLog;

#[derive(Debug, Deserialize)]
pub struct HistoryParamsDto {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryDto {
    pub id: Option<i32>,
    pub query: String,
    pub sql: Option<String>,
    pub answer: Option<String>,
    pub success: bool,
    pub execution_time_ms: f64,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponseDto {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub history: Vec<HistoryEntryDto>,
}

impl From<&QueryLog> for HistoryEntryDto {
    fn from(log: &QueryLog) -> Self {
        Self {
            id: log.id(),
            query: log.user_query().to_string(),
            sql: log.generated_sql().map(str::to_string),
            answer: log.final_answer().map(str::to_string),
            success: log.is_success(),
            execution_time_ms: log.execution_time_ms(),
            created_at: log.created_at().to_rfc3339(),
        }
    }
}

impl From<GetQueryHistoryResponse> for HistoryResponseDto {
    fn from(response: GetQueryHistoryResponse) -> Self {
        Self {
            total: response.total,
            limit: response.limit,
            offset: response.offset,
            history: response.logs.iter().map(HistoryEntryDto::from).collect(),
        }
    }
}
