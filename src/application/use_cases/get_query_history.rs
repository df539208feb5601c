use std::sync::Arc;

use crate::domain::entities::QueryLog;
use crate::domain::repositories::QueryLogRepository;

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum GetQueryHistoryError {
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct GetQueryHistoryRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct GetQueryHistoryResponse {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub logs: Vec<QueryLog>,
}

pub struct GetQueryHistoryUseCase {
    query_log_repository: Arc<dyn QueryLogRepository>,
}

impl GetQueryHistoryUseCase {
    pub fn new(query_log_repository: Arc<dyn QueryLogRepository>) -> Self {
        Self {
            query_log_repository,
        }
    }

    pub async fn execute(
        &self,
        request: GetQueryHistoryRequest,
    ) -> Result<GetQueryHistoryResponse, GetQueryHistoryError> {
        let limit = request.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let offset = request.offset.unwrap_or(0);

        if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
            return Err(GetQueryHistoryError::ValidationError(format!(
                "Limit must be between 1 and {}",
                MAX_HISTORY_LIMIT
            )));
        }
        if offset < 0 {
            return Err(GetQueryHistoryError::ValidationError(
                "Offset cannot be negative".to_string(),
            ));
        }

        let logs = self
            .query_log_repository
            .find_recent(limit, offset)
            .await
            .map_err(|e| GetQueryHistoryError::RepositoryError(e.to_string()))?;

        let total = self
            .query_log_repository
            .count()
            .await
            .map_err(|e| GetQueryHistoryError::RepositoryError(e.to_string()))?;

        Ok(GetQueryHistoryResponse {
            total,
            limit,
            offset,
            logs,
        })
    }
}
