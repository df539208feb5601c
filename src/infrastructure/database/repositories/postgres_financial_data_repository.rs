use async_trait::async_trait;
use diesel::prelude::*;

use crate::domain::entities::{
    Company, FinancialStatement, MarketData, PerformanceMetric, PortfolioCompany,
};
use crate::domain::repositories::{
    FinancialDataRepository,
    financial_data_repository::{FinancialDataRepositoryError, TableCounts},
};
use crate::infrastructure::database::models::{
    NewCompanyModel, NewFinancialStatementModel, NewMarketDataModel, NewPerformanceMetricModel,
    NewPortfolioCompanyModel,
};
use crate::infrastructure::database::schema::{
    companies, financial_statements, market_data, performance_metrics, portfolio_companies,
};
use crate::infrastructure::database::{DatabaseError, DbPool, with_connection};

// Postgres caps bind parameters at 65535 per statement.
const INSERT_CHUNK_ROWS: usize = 1000;

pub struct PostgresFinancialDataRepository {
    pool: DbPool,
}

impl PostgresFinancialDataRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: DatabaseError) -> FinancialDataRepositoryError {
    FinancialDataRepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl FinancialDataRepository for PostgresFinancialDataRepository {
    async fn upsert_company(&self, company: &Company) -> Result<i32, FinancialDataRepositoryError> {
        let new_company = NewCompanyModel::from(company);

        with_connection(&self.pool, move |conn| {
            conn.transaction(|conn| {
                let existing = match &new_company.ticker {
                    Some(ticker) => companies::table
                        .filter(companies::ticker.eq(ticker))
                        .select(companies::id)
                        .first::<i32>(conn)
                        .optional()?,
                    None => None,
                };
                let existing = match existing {
                    Some(id) => Some(id),
                    None => companies::table
                        .filter(companies::name.eq(&new_company.name))
                        .select(companies::id)
                        .first::<i32>(conn)
                        .optional()?,
                };

                match existing {
                    Some(id) => Ok(id),
                    None => diesel::insert_into(companies::table)
                        .values(&new_company)
                        .returning(companies::id)
                        .get_result(conn),
                }
            })
        })
        .await
        .map_err(db_error)
    }

    async fn find_company_id_by_name(
        &self,
        name: &str,
    ) -> Result<Option<i32>, FinancialDataRepositoryError> {
        let name = name.to_string();
        with_connection(&self.pool, move |conn| {
            companies::table
                .filter(companies::name.eq(name))
                .select(companies::id)
                .first::<i32>(conn)
                .optional()
        })
        .await
        .map_err(db_error)
    }

    async fn find_portfolio_id_by_company(
        &self,
        company_id: i32,
    ) -> Result<Option<i32>, FinancialDataRepositoryError> {
        with_connection(&self.pool, move |conn| {
            portfolio_companies::table
                .filter(portfolio_companies::company_id.eq(company_id))
                .order(portfolio_companies::id.asc())
                .select(portfolio_companies::id)
                .first::<i32>(conn)
                .optional()
        })
        .await
        .map_err(db_error)
    }

    async fn list_portfolio_company_ids(&self) -> Result<Vec<i32>, FinancialDataRepositoryError> {
        with_connection(&self.pool, |conn| {
            portfolio_companies::table
                .select(portfolio_companies::id)
                .order(portfolio_companies::id.asc())
                .load::<i32>(conn)
        })
        .await
        .map_err(db_error)
    }

    async fn insert_financial_statements(
        &self,
        statements: &[FinancialStatement],
    ) -> Result<usize, FinancialDataRepositoryError> {
        let rows: Vec<NewFinancialStatementModel> = statements.iter().map(Into::into).collect();

        with_connection(&self.pool, move |conn| {
            conn.transaction(|conn| {
                let mut inserted = 0;
                for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
                    inserted += diesel::insert_into(financial_statements::table)
                        .values(chunk)
                        .execute(conn)?;
                }
                Ok(inserted)
            })
        })
        .await
        .map_err(db_error)
    }

    async fn insert_portfolio_companies(
        &self,
        portfolios: &[PortfolioCompany],
    ) -> Result<usize, FinancialDataRepositoryError> {
        let rows: Vec<NewPortfolioCompanyModel> = portfolios.iter().map(Into::into).collect();

        with_connection(&self.pool, move |conn| {
            conn.transaction(|conn| {
                let mut inserted = 0;
                for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
                    inserted += diesel::insert_into(portfolio_companies::table)
                        .values(chunk)
                        .execute(conn)?;
                }
                Ok(inserted)
            })
        })
        .await
        .map_err(db_error)
    }

    async fn insert_performance_metrics(
        &self,
        metrics: &[PerformanceMetric],
    ) -> Result<usize, FinancialDataRepositoryError> {
        let rows: Vec<NewPerformanceMetricModel> = metrics.iter().map(Into::into).collect();

        with_connection(&self.pool, move |conn| {
            conn.transaction(|conn| {
                let mut inserted = 0;
                for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
                    inserted += diesel::insert_into(performance_metrics::table)
                        .values(chunk)
                        .execute(conn)?;
                }
                Ok(inserted)
            })
        })
        .await
        .map_err(db_error)
    }

    async fn insert_market_data(
        &self,
        bars: &[MarketData],
    ) -> Result<usize, FinancialDataRepositoryError> {
        let rows: Vec<NewMarketDataModel> = bars.iter().map(Into::into).collect();

        with_connection(&self.pool, move |conn| {
            conn.transaction(|conn| {
                let mut inserted = 0;
                for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
                    inserted += diesel::insert_into(market_data::table)
                        .values(chunk)
                        .execute(conn)?;
                }
                Ok(inserted)
            })
        })
        .await
        .map_err(db_error)
    }

    async fn table_counts(&self) -> Result<TableCounts, FinancialDataRepositoryError> {
        with_connection(&self.pool, |conn| {
            Ok(TableCounts {
                companies: companies::table.count().get_result(conn)?,
                financial_statements: financial_statements::table.count().get_result(conn)?,
                portfolio_companies: portfolio_companies::table.count().get_result(conn)?,
                performance_metrics: performance_metrics::table.count().get_result(conn)?,
                market_data: market_data::table.count().get_result(conn)?,
            })
        })
        .await
        .map_err(db_error)
    }
}
