use async_trait::async_trait;
use serde::Serialize;

use crate::domain::entities::{
    Company, FinancialStatement, MarketData, PerformanceMetric, PortfolioCompany,
};

#[derive(Debug, thiserror::Error)]
pub enum FinancialDataRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub companies: i64,
    pub financial_statements: i64,
    pub portfolio_companies: i64,
    pub performance_metrics: i64,
    pub market_data: i64,
}

#[async_trait]
pub trait FinancialDataRepository: Send + Sync {
    /// Returns the id of the existing company (matched by ticker, then name) or of the new row.
    async fn upsert_company(&self, company: &Company) -> Result<i32, FinancialDataRepositoryError>;
    async fn find_company_id_by_name(
        &self,
        name: &str,
    ) -> Result<Option<i32>, FinancialDataRepositoryError>;
    async fn find_portfolio_id_by_company(
        &self,
        company_id: i32,
    ) -> Result<Option<i32>, FinancialDataRepositoryError>;
    async fn list_portfolio_company_ids(&self) -> Result<Vec<i32>, FinancialDataRepositoryError>;

    async fn insert_financial_statements(
        &self,
        statements: &[FinancialStatement],
    ) -> Result<usize, FinancialDataRepositoryError>;
    async fn insert_portfolio_companies(
        &self,
        portfolios: &[PortfolioCompany],
    ) -> Result<usize, FinancialDataRepositoryError>;
    async fn insert_performance_metrics(
        &self,
        metrics: &[PerformanceMetric],
    ) -> Result<usize, FinancialDataRepositoryError>;
    async fn insert_market_data(
        &self,
        bars: &[MarketData],
    ) -> Result<usize, FinancialDataRepositoryError>;

    async fn table_counts(&self) -> Result<TableCounts, FinancialDataRepositoryError>;
}
