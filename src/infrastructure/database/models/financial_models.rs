use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::entities::{FinancialStatement, MarketData, PerformanceMetric, PortfolioCompany};
use crate::infrastructure::database::schema::{
    financial_statements, market_data, performance_metrics, portfolio_companies,
};

// Bulk-loaded rows are write-only from this service; reads go through generated SQL.

#[derive(Debug, Insertable)]
#[diesel(table_name = financial_statements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFinancialStatementModel {
    pub company_id: i32,
    pub statement_date: NaiveDate,
    pub period_type: Option<String>,
    pub fiscal_year: Option<i32>,
    pub revenue: Option<f64>,
    pub cost_of_revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_expenses: Option<f64>,
    pub ebitda: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub eps: Option<f64>,
    pub total_assets: Option<f64>,
    pub current_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub shareholders_equity: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub investing_cash_flow: Option<f64>,
    pub financing_cash_flow: Option<f64>,
    pub free_cash_flow: Option<f64>,
}

impl From<&FinancialStatement> for NewFinancialStatementModel {
    fn from(s: &FinancialStatement) -> Self {
        Self {
            company_id: s.company_id,
            statement_date: s.statement_date,
            period_type: s.period_type.clone(),
            fiscal_year: s.fiscal_year,
            revenue: s.revenue,
            cost_of_revenue: s.cost_of_revenue,
            gross_profit: s.gross_profit,
            operating_expenses: s.operating_expenses,
            ebitda: s.ebitda,
            operating_income: s.operating_income,
            net_income: s.net_income,
            eps: s.eps,
            total_assets: s.total_assets,
            current_assets: s.current_assets,
            total_liabilities: s.total_liabilities,
            current_liabilities: s.current_liabilities,
            shareholders_equity: s.shareholders_equity,
            operating_cash_flow: s.operating_cash_flow,
            investing_cash_flow: s.investing_cash_flow,
            financing_cash_flow: s.financing_cash_flow,
            free_cash_flow: s.free_cash_flow,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = portfolio_companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPortfolioCompanyModel {
    pub company_id: i32,
    pub investment_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub investment_amount: Option<f64>,
    pub current_valuation: Option<f64>,
    pub ownership_percentage: Option<f64>,
    pub investment_stage: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl From<&PortfolioCompany> for NewPortfolioCompanyModel {
    fn from(p: &PortfolioCompany) -> Self {
        Self {
            company_id: p.company_id,
            investment_date: p.investment_date,
            exit_date: p.exit_date,
            investment_amount: p.investment_amount,
            current_valuation: p.current_valuation,
            ownership_percentage: p.ownership_percentage,
            investment_stage: p.investment_stage.clone(),
            status: p.status.clone(),
            notes: p.notes.clone(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = performance_metrics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPerformanceMetricModel {
    pub portfolio_company_id: i32,
    pub metric_date: NaiveDate,
    pub arr: Option<f64>,
    pub mrr: Option<f64>,
    pub customer_count: Option<i32>,
    pub churn_rate: Option<f64>,
    pub cac: Option<f64>,
    pub ltv: Option<f64>,
    pub burn_rate: Option<f64>,
    pub runway_months: Option<f64>,
    pub revenue_multiple: Option<f64>,
    pub ebitda_multiple: Option<f64>,
    pub notes: Option<String>,
}

impl From<&PerformanceMetric> for NewPerformanceMetricModel {
    fn from(m: &PerformanceMetric) -> Self {
        Self {
            portfolio_company_id: m.portfolio_company_id,
            metric_date: m.metric_date,
            arr: m.arr,
            mrr: m.mrr,
            customer_count: m.customer_count,
            churn_rate: m.churn_rate,
            cac: m.cac,
            ltv: m.ltv,
            burn_rate: m.burn_rate,
            runway_months: m.runway_months,
            revenue_multiple: m.revenue_multiple,
            ebitda_multiple: m.ebitda_multiple,
            notes: m.notes.clone(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = market_data)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewMarketDataModel {
    pub ticker: String,
    pub date: NaiveDate,
    pub open_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub close_price: Option<f64>,
    pub volume: Option<i64>,
    pub adj_close: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_200: Option<f64>,
}

impl From<&MarketData> for NewMarketDataModel {
    fn from(bar: &MarketData) -> Self {
        Self {
            ticker: bar.ticker.clone(),
            date: bar.date,
            open_price: bar.open_price,
            high_price: bar.high_price,
            low_price: bar.low_price,
            close_price: bar.close_price,
            volume: bar.volume,
            adj_close: bar.adj_close,
            ma_50: bar.ma_50,
            ma_200: bar.ma_200,
        }
    }
}
