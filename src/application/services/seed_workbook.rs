use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::entities::{Company, FinancialStatement, PerformanceMetric, PortfolioCompany};

#[derive(Debug, thiserror::Error)]
pub enum SeedWorkbookError {
    #[error("Invalid workbook JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Invalid workbook layout: {0}")]
    InvalidLayout(String),
}

/// Which loader a sheet feeds, decided from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Portfolio,
    Financial,
    Metrics,
}

impl SheetKind {
    pub fn from_sheet_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.contains("portfolio") || name.contains("company") {
            Some(SheetKind::Portfolio)
        } else if name.contains("financial") || name.contains("statement") {
            Some(SheetKind::Financial)
        } else if name.contains("metric") || name.contains("performance") {
            Some(SheetKind::Metrics)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedSheet {
    pub name: String,
    pub rows: Vec<SeedRow>,
}

/// A spreadsheet export: `{"sheets": {"<name>": [{"<header>": value}]}}`, sheets in file order.
#[derive(Debug, Clone)]
pub struct SeedWorkbook {
    pub sheets: Vec<SeedSheet>,
}

impl SeedWorkbook {
    pub fn parse(json: &str) -> Result<Self, SeedWorkbookError> {
        let root: Value = serde_json::from_str(json)?;
        let sheets = root
            .get("sheets")
            .and_then(Value::as_object)
            .ok_or_else(|| SeedWorkbookError::InvalidLayout("missing \"sheets\" object".into()))?;

        let sheets = sheets
            .iter()
            .map(|(name, rows)| {
                let rows = rows.as_array().ok_or_else(|| {
                    SeedWorkbookError::InvalidLayout(format!("sheet '{}' is not an array", name))
                })?;
                Ok(SeedSheet {
                    name: name.clone(),
                    rows: rows
                        .iter()
                        .filter_map(Value::as_object)
                        .cloned()
                        .map(SeedRow)
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>, SeedWorkbookError>>()?;

        Ok(Self { sheets })
    }
}

#[derive(Debug, Clone)]
pub struct PortfolioSeed {
    pub company: Company,
    /// Only rows with an investment date create a portfolio entry; `company_id` is filled in on load.
    pub portfolio: Option<PortfolioCompany>,
}

/// One spreadsheet row keyed by header.
#[derive(Debug, Clone)]
pub struct SeedRow(pub Map<String, Value>);

impl SeedRow {
    fn raw(&self, headers: &[&str]) -> Option<&Value> {
        headers
            .iter()
            .filter_map(|h| self.0.get(*h))
            .find(|v| !is_blank(v))
    }

    pub fn text(&self, headers: &[&str]) -> Option<String> {
        match self.raw(headers)? {
            Value::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn number(&self, header: &str) -> Option<f64> {
        match self.raw(&[header])? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s
                .trim()
                .trim_end_matches('%')
                .replace([',', '$'], "")
                .parse()
                .ok(),
            _ => None,
        }
    }

    pub fn integer(&self, header: &str) -> Option<i32> {
        self.number(header).map(|n| n.round() as i32)
    }

    pub fn date(&self, header: &str) -> Option<NaiveDate> {
        let Value::String(s) = self.raw(&[header])? else {
            return None;
        };
        let s = s.trim();
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
            .ok()
    }

    pub fn company_name(&self, allow_bare_name: bool) -> Option<String> {
        if allow_bare_name {
            self.text(&["Company Name", "Company", "Name"])
        } else {
            self.text(&["Company Name", "Company"])
        }
    }

    pub fn to_portfolio_seed(&self) -> Option<PortfolioSeed> {
        let name = self.company_name(true)?;
        let company = Company::new(name)
            .with_ticker(self.text(&["Ticker"]))
            .with_classification(self.text(&["Sector"]), self.text(&["Industry"]))
            .with_description(self.text(&["Description"]));

        let portfolio = self.date("Investment Date").map(|investment_date| {
            let mut portfolio = PortfolioCompany::new(0, investment_date);
            portfolio.investment_amount = self.number("Investment Amount");
            portfolio.current_valuation = self.number("Current Valuation");
            portfolio.ownership_percentage = self.number("Ownership %");
            portfolio.investment_stage = self.text(&["Stage"]);
            if let Some(status) = self.text(&["Status"]) {
                portfolio.status = Some(status);
            }
            portfolio
        });

        Some(PortfolioSeed { company, portfolio })
    }

    /// Statement with `company_id` left at 0.
    pub fn to_financial_statement(&self) -> FinancialStatement {
        let today = Utc::now().date_naive();
        FinancialStatement {
            company_id: 0,
            statement_date: self.date("Date").unwrap_or(today),
            period_type: Some(self.text(&["Period"]).unwrap_or_else(|| "Annual".to_string())),
            fiscal_year: Some(self.integer("Year").unwrap_or(today.year())),
            revenue: self.number("Revenue"),
            gross_profit: self.number("Gross Profit"),
            operating_income: self.number("Operating Income"),
            net_income: self.number("Net Income"),
            total_assets: self.number("Total Assets"),
            total_liabilities: self.number("Total Liabilities"),
            shareholders_equity: self.number("Equity"),
            ..Default::default()
        }
    }

    /// Metric with `portfolio_company_id` left at 0.
    pub fn to_performance_metric(&self) -> PerformanceMetric {
        PerformanceMetric {
            portfolio_company_id: 0,
            metric_date: self.date("Date").unwrap_or_else(|| Utc::now().date_naive()),
            arr: self.number("ARR"),
            mrr: self.number("MRR"),
            customer_count: self.integer("Customers"),
            churn_rate: self.number("Churn Rate"),
            ..Default::default()
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKBOOK: &str = r#"{
        "sheets": {
            "Portfolio Companies": [
                {"Company Name": "Acme Analytics", "Ticker": "acme", "Sector": "Software",
                 "Investment Date": "2021-03-15", "Investment Amount": "2,500,000",
                 "Ownership %": 12.5, "Stage": "Series B"},
                {"Company Name": "", "Name": "Beta Labs"},
                {"Company": null, "Sector": "Orphan"}
            ],
            "Financial Statements": [
                {"Company": "Acme Analytics", "Date": "2023-12-31", "Revenue": 1200000, "Equity": 300000}
            ],
            "Performance Metrics": [
                {"Company Name": "Acme Analytics", "Date": "2024-01-31 00:00:00", "ARR": 950000, "Customers": 41}
            ],
            "Notes": []
        }
    }"#;

    #[test]
    fn test_sheets_keep_file_order_and_route_by_name() {
        let workbook = SeedWorkbook::parse(WORKBOOK).unwrap();
        let kinds: Vec<Option<SheetKind>> = workbook
            .sheets
            .iter()
            .map(|s| SheetKind::from_sheet_name(&s.name))
            .collect();

        assert_eq!(
            kinds,
            vec![
                Some(SheetKind::Portfolio),
                Some(SheetKind::Financial),
                Some(SheetKind::Metrics),
                None
            ]
        );
    }

    #[test]
    fn test_portfolio_rows() {
        let workbook = SeedWorkbook::parse(WORKBOOK).unwrap();
        let rows = &workbook.sheets[0].rows;

        let acme = rows[0].to_portfolio_seed().unwrap();
        assert_eq!(acme.company.name(), "Acme Analytics");
        assert_eq!(acme.company.ticker(), Some("ACME"));
        let portfolio = acme.portfolio.unwrap();
        assert_eq!(portfolio.investment_amount, Some(2_500_000.0));
        assert_eq!(portfolio.ownership_percentage, Some(12.5));
        assert_eq!(portfolio.status.as_deref(), Some("Active"));

        // blank "Company Name" falls through to "Name"; no investment date means no portfolio row
        let beta = rows[1].to_portfolio_seed().unwrap();
        assert_eq!(beta.company.name(), "Beta Labs");
        assert!(beta.portfolio.is_none());

        assert!(rows[2].to_portfolio_seed().is_none());
    }

    #[test]
    fn test_financial_and_metric_rows() {
        let workbook = SeedWorkbook::parse(WORKBOOK).unwrap();

        let statement_row = &workbook.sheets[1].rows[0];
        assert_eq!(statement_row.company_name(false).as_deref(), Some("Acme Analytics"));
        let statement = statement_row.to_financial_statement();
        assert_eq!(statement.statement_date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(statement.period_type.as_deref(), Some("Annual"));
        assert_eq!(statement.revenue, Some(1_200_000.0));
        assert_eq!(statement.shareholders_equity, Some(300_000.0));

        let metric = workbook.sheets[2].rows[0].to_performance_metric();
        assert_eq!(metric.metric_date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(metric.customer_count, Some(41));
        assert_eq!(metric.mrr, None);
    }

    #[test]
    fn test_rejects_missing_sheets() {
        assert!(matches!(
            SeedWorkbook::parse(r#"{"tabs": {}}"#),
            Err(SeedWorkbookError::InvalidLayout(_))
        ));
        assert!(matches!(
            SeedWorkbook::parse("not json"),
            Err(SeedWorkbookError::InvalidJson(_))
        ));
    }
}
