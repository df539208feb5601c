use chrono::{Datelike, Days, NaiveDate, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::ports::MarketDataProvider;
use crate::application::ports::market_data_provider::{PriceBar, QuarterlyFundamentals};
use crate::application::services::seed_workbook::{SeedWorkbook, SeedWorkbookError, SheetKind};
use crate::domain::entities::financial_records::apply_moving_averages;
use crate::domain::entities::{Company, FinancialStatement, MarketData, PerformanceMetric};
use crate::domain::repositories::FinancialDataRepository;
use crate::domain::repositories::financial_data_repository::FinancialDataRepositoryError;

const MAX_QUARTERS: usize = 12;
const METRIC_BATCH_SIZE: usize = 1000;
const METRIC_DATE_SPAN_DAYS: u64 = 1460;

#[derive(Debug, thiserror::Error)]
pub enum DataLoaderError {
    #[error("Failed to read seed file: {0}")]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Workbook(#[from] SeedWorkbookError),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] FinancialDataRepositoryError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub companies: usize,
    pub portfolio_companies: usize,
    pub financial_statements: usize,
    pub performance_metrics: usize,
    pub skipped_rows: usize,
}

/// Populates the financial tables from a seed workbook, live market data and synthetic metrics.
pub struct DataLoader {
    repository: Arc<dyn FinancialDataRepository>,
    market_data: Arc<dyn MarketDataProvider>,
}

impl DataLoader {
    pub fn new(
        repository: Arc<dyn FinancialDataRepository>,
        market_data: Arc<dyn MarketDataProvider>,
    ) -> Self {
        Self {
            repository,
            market_data,
        }
    }

    pub async fn load_seed_file(&self, path: &Path) -> Result<SeedSummary, DataLoaderError> {
        let contents = tokio::fs::read_to_string(path).await?;
        let workbook = SeedWorkbook::parse(&contents)?;
        info!(
            "Found sheets: {:?}",
            workbook.sheets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
        );
        self.load_seed_workbook(&workbook).await
    }

    pub async fn load_seed_workbook(
        &self,
        workbook: &SeedWorkbook,
    ) -> Result<SeedSummary, DataLoaderError> {
        let mut summary = SeedSummary::default();

        for sheet in &workbook.sheets {
            let Some(kind) = SheetKind::from_sheet_name(&sheet.name) else {
                info!("Ignoring sheet '{}'", sheet.name);
                continue;
            };
            info!("Processing sheet '{}' with {} rows", sheet.name, sheet.rows.len());

            match kind {
                SheetKind::Portfolio => {
                    let mut portfolios = Vec::new();
                    for row in &sheet.rows {
                        let Some(seed) = row.to_portfolio_seed() else {
                            summary.skipped_rows += 1;
                            continue;
                        };

                        let company_id = match self
                            .repository
                            .find_company_id_by_name(seed.company.name())
                            .await?
                        {
                            Some(id) => id,
                            None => {
                                summary.companies += 1;
                                self.repository.upsert_company(&seed.company).await?
                            }
                        };

                        if let Some(mut portfolio) = seed.portfolio {
                            portfolio.company_id = company_id;
                            portfolios.push(portfolio);
                        }
                    }
                    summary.portfolio_companies +=
                        self.repository.insert_portfolio_companies(&portfolios).await?;
                }
                SheetKind::Financial => {
                    let mut statements = Vec::new();
                    for row in &sheet.rows {
                        let company_id = match row.company_name(false) {
                            Some(name) => self.repository.find_company_id_by_name(&name).await?,
                            None => None,
                        };
                        let Some(company_id) = company_id else {
                            summary.skipped_rows += 1;
                            continue;
                        };

                        let mut statement = row.to_financial_statement();
                        statement.company_id = company_id;
                        statements.push(statement);
                    }
                    summary.financial_statements +=
                        self.repository.insert_financial_statements(&statements).await?;
                }
                SheetKind::Metrics => {
                    let mut metrics = Vec::new();
                    for row in &sheet.rows {
                        let portfolio_id = match row.company_name(false) {
                            Some(name) => match self.repository.find_company_id_by_name(&name).await? {
                                Some(company_id) => {
                                    self.repository
                                        .find_portfolio_id_by_company(company_id)
                                        .await?
                                }
                                None => None,
                            },
                            None => None,
                        };
                        let Some(portfolio_id) = portfolio_id else {
                            summary.skipped_rows += 1;
                            continue;
                        };

                        let mut metric = row.to_performance_metric();
                        metric.portfolio_company_id = portfolio_id;
                        metrics.push(metric);
                    }
                    summary.performance_metrics +=
                        self.repository.insert_performance_metrics(&metrics).await?;
                }
            }
        }

        info!("Seed workbook loaded: {:?}", summary);
        Ok(summary)
    }

    /// Pulls profile, daily prices and recent quarterly statements for each ticker.
    /// A failing ticker is logged and skipped. Returns how many tickers succeeded.
    pub async fn synthesize_financial_data(&self, tickers: &[String], years: u32) -> usize {
        info!("Synthesizing financial data for {} tickers", tickers.len());
        let end = Utc::now().date_naive();
        let start = end - Days::new(365 * u64::from(years));

        let mut synthesized = 0;
        for ticker in tickers {
            match self.synthesize_ticker(ticker, start, end).await {
                Ok((bars, statements)) => {
                    info!(
                        "Synthesized {}: {} market data points, {} quarterly statements",
                        ticker, bars, statements
                    );
                    synthesized += 1;
                }
                Err(e) => warn!("Error synthesizing data for {}: {}", ticker, e),
            }
        }
        synthesized
    }

    async fn synthesize_ticker(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(usize, usize), Box<dyn std::error::Error + Send + Sync>> {
        let profile = self.market_data.company_profile(ticker).await?;
        let company = Company::new(profile.name.unwrap_or_else(|| ticker.to_string()))
            .with_ticker(Some(ticker.to_string()))
            .with_classification(profile.sector, profile.industry)
            .with_description(profile.description);
        let company_id = self.repository.upsert_company(&company).await?;

        let history = self.market_data.daily_history(ticker, start, end).await?;
        let mut bars: Vec<MarketData> = history.iter().map(|bar| market_data(ticker, bar)).collect();
        bars.sort_by_key(|bar| bar.date);
        apply_moving_averages(&mut bars);
        let inserted_bars = self.repository.insert_market_data(&bars).await?;

        let statements: Vec<FinancialStatement> = self
            .market_data
            .quarterly_fundamentals(ticker)
            .await?
            .iter()
            .take(MAX_QUARTERS)
            .map(|quarter| quarterly_statement(company_id, quarter))
            .collect();
        let inserted_statements = self
            .repository
            .insert_financial_statements(&statements)
            .await?;

        Ok((inserted_bars, inserted_statements))
    }

    /// Random metrics spread over the existing portfolio companies. Returns how many were stored.
    pub async fn generate_synthetic_performance_metrics(
        &self,
        num_records: usize,
    ) -> Result<usize, DataLoaderError> {
        let portfolio_ids = self.repository.list_portfolio_company_ids().await?;
        if portfolio_ids.is_empty() {
            warn!("No portfolio companies found, skipping synthetic metrics");
            return Ok(0);
        }

        info!("Generating {} synthetic performance metrics", num_records);
        let mut generated = 0;
        while generated < num_records {
            let batch_size = METRIC_BATCH_SIZE.min(num_records - generated);
            let batch = synthetic_metrics(&mut rand::thread_rng(), &portfolio_ids, batch_size);
            generated += self.repository.insert_performance_metrics(&batch).await?;
            info!("Generated {} metrics...", generated);
        }

        Ok(generated)
    }
}

fn market_data(ticker: &str, bar: &PriceBar) -> MarketData {
    MarketData {
        ticker: ticker.to_string(),
        date: bar.date,
        open_price: bar.open,
        high_price: bar.high,
        low_price: bar.low,
        close_price: bar.close,
        volume: bar.volume,
        adj_close: bar.adj_close.or(bar.close),
        ma_50: None,
        ma_200: None,
    }
}

fn quarterly_statement(company_id: i32, quarter: &QuarterlyFundamentals) -> FinancialStatement {
    FinancialStatement {
        company_id,
        statement_date: quarter.period_end,
        period_type: Some("Quarterly".to_string()),
        fiscal_year: Some(quarter.period_end.year()),
        revenue: quarter.revenue,
        cost_of_revenue: quarter.cost_of_revenue,
        gross_profit: quarter.gross_profit,
        operating_income: quarter.operating_income,
        ebitda: quarter.ebitda,
        net_income: quarter.net_income,
        total_assets: quarter.total_assets,
        total_liabilities: quarter.total_liabilities,
        shareholders_equity: quarter.shareholders_equity,
        operating_cash_flow: quarter.operating_cash_flow,
        free_cash_flow: quarter.free_cash_flow,
        ..Default::default()
    }
}

fn synthetic_metrics<R: Rng>(
    rng: &mut R,
    portfolio_ids: &[i32],
    count: usize,
) -> Vec<PerformanceMetric> {
    let base_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();

    (0..count)
        .filter_map(|_| {
            let portfolio_company_id = *portfolio_ids.choose(rng)?;
            Some(PerformanceMetric {
                portfolio_company_id,
                metric_date: base_date + Days::new(rng.gen_range(0..=METRIC_DATE_SPAN_DAYS)),
                arr: Some(rng.gen_range(100_000.0..10_000_000.0)),
                mrr: Some(rng.gen_range(10_000.0..1_000_000.0)),
                customer_count: Some(rng.gen_range(10..=10_000)),
                churn_rate: Some(rng.gen_range(0.01..0.15)),
                cac: Some(rng.gen_range(100.0..5_000.0)),
                ltv: Some(rng.gen_range(1_000.0..50_000.0)),
                burn_rate: Some(rng.gen_range(10_000.0..500_000.0)),
                runway_months: Some(rng.gen_range(6.0..36.0)),
                revenue_multiple: Some(rng.gen_range(2.0..20.0)),
                ebitda_multiple: Some(rng.gen_range(5.0..30.0)),
                notes: None,
            })
        })
        .collect()
}
