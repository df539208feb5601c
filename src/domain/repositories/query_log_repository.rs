use async_trait::async_trait;

use crate::domain::entities::QueryLog;

#[derive(Debug, thiserror::Error)]
pub enum QueryLogRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[async_trait]
pub trait QueryLogRepository: Send + Sync {
    async fn save(&self, log: &QueryLog) -> Result<(), QueryLogRepositoryError>;
    /// Newest first.
    async fn find_recent(&self, limit: i64, offset: i64)
    -> Result<Vec<QueryLog>, QueryLogRepositoryError>;
    async fn count(&self) -> Result<i64, QueryLogRepositoryError>;
    async fn count_successful(&self) -> Result<i64, QueryLogRepositoryError>;
}
