use std::sync::Arc;

use crate::application::ports::VectorIndex;
use crate::application::ports::vector_index::IndexStats;
use crate::domain::repositories::financial_data_repository::TableCounts;
use crate::domain::repositories::{FinancialDataRepository, QueryLogRepository};

#[derive(Debug, thiserror::Error)]
pub enum GetPlatformStatsError {
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Vector store error: {0}")]
    VectorStoreError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlatformStats {
    pub total_queries: i64,
    pub successful_queries: i64,
    /// Percentage in `[0, 100]`; 0 when nothing has been asked yet.
    pub success_rate: f64,
    pub table_counts: TableCounts,
    pub vector_store: IndexStats,
}

pub struct GetPlatformStatsUseCase {
    query_log_repository: Arc<dyn QueryLogRepository>,
    financial_repository: Arc<dyn FinancialDataRepository>,
    vector_index: Arc<dyn VectorIndex>,
}

impl GetPlatformStatsUseCase {
    pub fn new(
        query_log_repository: Arc<dyn QueryLogRepository>,
        financial_repository: Arc<dyn FinancialDataRepository>,
        vector_index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            query_log_repository,
            financial_repository,
            vector_index,
        }
    }

    pub async fn execute(&self) -> Result<PlatformStats, GetPlatformStatsError> {
        let total_queries = self
            .query_log_repository
            .count()
            .await
            .map_err(|e| GetPlatformStatsError::RepositoryError(e.to_string()))?;
        let successful_queries = self
            .query_log_repository
            .count_successful()
            .await
            .map_err(|e| GetPlatformStatsError::RepositoryError(e.to_string()))?;

        let table_counts = self
            .financial_repository
            .table_counts()
            .await
            .map_err(|e| GetPlatformStatsError::RepositoryError(e.to_string()))?;

        let vector_store = self
            .vector_index
            .stats()
            .await
            .map_err(|e| GetPlatformStatsError::VectorStoreError(e.to_string()))?;

        let success_rate = if total_queries > 0 {
            successful_queries as f64 / total_queries as f64 * 100.0
        } else {
            0.0
        };

        Ok(PlatformStats {
            total_queries,
            successful_queries,
            success_rate,
            table_counts,
            vector_store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::QueryLog;
    use crate::infrastructure::vector_store::MemoryVectorIndex;
    use crate::test_support::{
        InMemoryFinancialRepository, InMemoryQueryLogRepository, KeywordEmbeddingProvider,
    };

    fn use_case(logs: Arc<InMemoryQueryLogRepository>) -> GetPlatformStatsUseCase {
        GetPlatformStatsUseCase::new(
            logs,
            Arc::new(InMemoryFinancialRepository::with_portfolios(2)),
            Arc::new(MemoryVectorIndex::new(
                Arc::new(KeywordEmbeddingProvider::financial()),
                None,
            )),
        )
    }

    #[tokio::test]
    async fn test_success_rate_is_a_percentage() {
        let logs = Arc::new(InMemoryQueryLogRepository::default());
        for success in [true, true, true, false] {
            let log = if success {
                QueryLog::succeeded("q".into(), None, None, None, None, None, 1.0)
            } else {
                QueryLog::failed("q".into(), None, "e".into(), None, 1.0)
            };
            logs.save(&log).await.unwrap();
        }

        let stats = use_case(logs).execute().await.unwrap();

        assert_eq!(stats.total_queries, 4);
        assert_eq!(stats.successful_queries, 3);
        assert_eq!(stats.success_rate, 75.0);
        assert_eq!(stats.table_counts.portfolio_companies, 2);
        assert_eq!(stats.vector_store.total_documents, 0);
    }

    #[tokio::test]
    async fn test_no_queries_means_zero_rate() {
        let stats = use_case(Arc::new(InMemoryQueryLogRepository::default()))
            .execute()
            .await
            .unwrap();

        assert_eq!(stats.success_rate, 0.0);
    }
}
