use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::ports::vector_index::IndexStats;
use crate::application::services::data_loader::{DataLoaderError, SeedSummary};
use crate::application::services::{DataLoader, SchemaIndexer};
use crate::domain::repositories::FinancialDataRepository;
use crate::domain::repositories::financial_data_repository::TableCounts;

pub const DEFAULT_TICKERS: [&str; 10] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "NVDA", "JPM", "BAC", "WMT",
];

#[derive(Debug, thiserror::Error)]
pub enum SetupDataError {
    #[error("Seed data error: {0}")]
    SeedError(#[from] DataLoaderError),
    #[error("Indexing error: {0}")]
    IndexingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

#[derive(Debug, Clone)]
pub struct SetupDataRequest {
    pub seed_path: Option<PathBuf>,
    pub tickers: Vec<String>,
    pub years: u32,
    pub metrics: usize,
}

#[derive(Debug, Clone)]
pub struct SetupReport {
    pub seed: Option<SeedSummary>,
    pub tickers_synthesized: usize,
    pub metrics_generated: usize,
    pub schema_elements_indexed: usize,
    pub table_counts: TableCounts,
    pub vector_store: IndexStats,
}

/// Seed workbook, market data, synthetic metrics, then the schema index.
/// Migrations are expected to have run already.
pub struct SetupDataUseCase {
    data_loader: Arc<DataLoader>,
    schema_indexer: Arc<SchemaIndexer>,
    financial_repository: Arc<dyn FinancialDataRepository>,
}

impl SetupDataUseCase {
    pub fn new(
        data_loader: Arc<DataLoader>,
        schema_indexer: Arc<SchemaIndexer>,
        financial_repository: Arc<dyn FinancialDataRepository>,
    ) -> Self {
        Self {
            data_loader,
            schema_indexer,
            financial_repository,
        }
    }

    pub async fn execute(&self, request: SetupDataRequest) -> Result<SetupReport, SetupDataError> {
        let seed = match &request.seed_path {
            Some(path) if path.exists() => {
                info!("[2/5] Loading seed workbook from {}", path.display());
                Some(self.data_loader.load_seed_file(path).await?)
            }
            Some(path) => {
                warn!("[2/5] Seed workbook not found at {}, skipping", path.display());
                None
            }
            None => None,
        };

        info!("[3/5] Synthesizing financial data from Yahoo Finance");
        let tickers_synthesized = self
            .data_loader
            .synthesize_financial_data(&request.tickers, request.years)
            .await;

        info!("[4/5] Generating synthetic performance metrics");
        let metrics_generated = self
            .data_loader
            .generate_synthetic_performance_metrics(request.metrics)
            .await?;

        info!("[5/5] Indexing database schema into vector store");
        let schema_elements_indexed = self
            .schema_indexer
            .index_database_schema()
            .await
            .map_err(|e| SetupDataError::IndexingError(e.to_string()))?;

        let table_counts = self
            .financial_repository
            .table_counts()
            .await
            .map_err(|e| SetupDataError::RepositoryError(e.to_string()))?;
        let vector_store = self
            .schema_indexer
            .vector_index()
            .stats()
            .await
            .map_err(|e| SetupDataError::IndexingError(e.to_string()))?;

        Ok(SetupReport {
            seed,
            tickers_synthesized,
            metrics_generated,
            schema_elements_indexed,
            table_counts,
            vector_store,
        })
    }
}
