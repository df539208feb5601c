use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Plain value records loaded in bulk; identity is assigned by the database.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
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

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCompany {
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

impl PortfolioCompany {
    pub fn new(company_id: i32, investment_date: NaiveDate) -> Self {
        Self {
            company_id,
            investment_date,
            status: Some("Active".to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
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

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
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

/// Fills `ma_50` / `ma_200` from trailing closes. Bars must be sorted by date.
pub fn apply_moving_averages(bars: &mut [MarketData]) {
    let closes: Vec<Option<f64>> = bars.iter().map(|bar| bar.close_price).collect();

    for (i, bar) in bars.iter_mut().enumerate() {
        bar.ma_50 = trailing_mean(&closes, i, 50);
        bar.ma_200 = trailing_mean(&closes, i, 200);
    }
}

fn trailing_mean(values: &[Option<f64>], end: usize, window: usize) -> Option<f64> {
    if end + 1 < window {
        return None;
    }
    let slice = &values[end + 1 - window..=end];
    let sum: Option<f64> = slice.iter().copied().sum();
    sum.map(|total| total / window as f64)
}
