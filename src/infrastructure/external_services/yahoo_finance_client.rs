use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::{Client, Error as ReqwestError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use crate::application::ports::MarketDataProvider;
use crate::application::ports::market_data_provider::{
    CompanyProfile, MarketDataError, MarketSnapshot, PriceBar, QuarterlyFundamentals,
};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; finquery/0.1)";
const DESCRIPTION_LIMIT: usize = 500;

/// Client for Yahoo Finance's public JSON endpoints (quote, quoteSummary, chart).
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, MarketDataError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
            .map_err(|e| MarketDataError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(MarketDataError::ApiError(format!("HTTP {} for {}", status, path)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| MarketDataError::ParseError(e.to_string()))
    }

    async fn quote_summary(&self, ticker: &str, modules: &str) -> Result<Value, MarketDataError> {
        let body = self
            .get_json(
                &format!("/v10/finance/quoteSummary/{}", ticker),
                &[("modules", modules.to_string())],
            )
            .await?;

        body.pointer("/quoteSummary/result/0")
            .cloned()
            .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))
    }
}

/// Yahoo wraps most numbers as `{"raw": 1.0, "fmt": "1.00"}`; plain numbers also occur.
fn raw_number(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map.get("raw").and_then(Value::as_f64),
        _ => None,
    }
}

fn text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn epoch_date(seconds: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}

fn epoch_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn parse_quote(ticker: &str, body: &Value) -> Result<MarketSnapshot, MarketDataError> {
    let quote = body
        .pointer("/quoteResponse/result/0")
        .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))?;

    Ok(MarketSnapshot {
        ticker: ticker.to_string(),
        current_price: raw_number(quote, "regularMarketPrice"),
        market_cap: raw_number(quote, "marketCap"),
        pe_ratio: raw_number(quote, "trailingPE"),
        dividend_yield: raw_number(quote, "trailingAnnualDividendYield")
            .or_else(|| raw_number(quote, "dividendYield")),
        fifty_two_week_high: raw_number(quote, "fiftyTwoWeekHigh"),
        fifty_two_week_low: raw_number(quote, "fiftyTwoWeekLow"),
        volume: raw_number(quote, "regularMarketVolume").map(|v| v as i64),
        fetched_at: Utc::now(),
    })
}

fn parse_profile(ticker: &str, summary: &Value) -> CompanyProfile {
    let null = Value::Null;
    let asset_profile = summary.get("assetProfile").unwrap_or(&null);
    let price = summary.get("price").unwrap_or(&null);

    CompanyProfile {
        ticker: ticker.to_string(),
        name: text(price, "longName").or_else(|| text(price, "shortName")),
        sector: text(asset_profile, "sector"),
        industry: text(asset_profile, "industry"),
        description: text(asset_profile, "longBusinessSummary")
            .map(|d| d.chars().take(DESCRIPTION_LIMIT).collect()),
    }
}

fn parse_chart(ticker: &str, body: &Value) -> Result<Vec<PriceBar>, MarketDataError> {
    let result = body
        .pointer("/chart/result/0")
        .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))?;

    let Some(timestamps) = result.get("timestamp").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    let null = Value::Null;
    let quote = result.pointer("/indicators/quote/0").unwrap_or(&null);
    let adjclose = result.pointer("/indicators/adjclose/0/adjclose").unwrap_or(&null);

    let series = |name: &str, index: usize| {
        quote
            .get(name)
            .and_then(|s| s.get(index))
            .and_then(Value::as_f64)
    };

    let mut bars: Vec<PriceBar> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let date = epoch_date(ts.as_i64()?)?;
            Some(PriceBar {
                date,
                open: series("open", i),
                high: series("high", i),
                low: series("low", i),
                close: series("close", i),
                adj_close: adjclose.get(i).and_then(Value::as_f64),
                volume: series("volume", i).map(|v| v as i64),
            })
        })
        .collect();

    bars.sort_by_key(|bar| bar.date);
    Ok(bars)
}

fn parse_fundamentals(summary: &Value) -> Vec<QuarterlyFundamentals> {
    let mut quarters: BTreeMap<NaiveDate, QuarterlyFundamentals> = BTreeMap::new();

    let statements = |pointer: &str| -> Vec<(NaiveDate, Value)> {
        summary
            .pointer(pointer)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let end = raw_number(item, "endDate")? as i64;
                        Some((epoch_date(end)?, item.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    };

    for (date, item) in statements("/incomeStatementHistoryQuarterly/incomeStatementHistory") {
        let quarter = quarters.entry(date).or_insert_with(|| QuarterlyFundamentals {
            period_end: date,
            ..Default::default()
        });
        quarter.revenue = raw_number(&item, "totalRevenue");
        quarter.cost_of_revenue = raw_number(&item, "costOfRevenue");
        quarter.gross_profit = raw_number(&item, "grossProfit");
        quarter.operating_income = raw_number(&item, "operatingIncome");
        quarter.ebitda = raw_number(&item, "ebitda");
        quarter.net_income = raw_number(&item, "netIncome");
    }

    for (date, item) in statements("/balanceSheetHistoryQuarterly/balanceSheetStatements") {
        let quarter = quarters.entry(date).or_insert_with(|| QuarterlyFundamentals {
            period_end: date,
            ..Default::default()
        });
        quarter.total_assets = raw_number(&item, "totalAssets");
        quarter.total_liabilities = raw_number(&item, "totalLiab");
        quarter.shareholders_equity = raw_number(&item, "totalStockholderEquity");
    }

    for (date, item) in statements("/cashflowStatementHistoryQuarterly/cashflowStatements") {
        let quarter = quarters.entry(date).or_insert_with(|| QuarterlyFundamentals {
            period_end: date,
            ..Default::default()
        });
        let operating = raw_number(&item, "totalCashFromOperatingActivities");
        quarter.operating_cash_flow = operating;
        // capitalExpenditures is reported as a negative outflow
        quarter.free_cash_flow = match (operating, raw_number(&item, "capitalExpenditures")) {
            (Some(ocf), Some(capex)) => Some(ocf + capex),
            _ => None,
        };
    }

    quarters.into_values().rev().collect()
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn quote(&self, ticker: &str) -> Result<MarketSnapshot, MarketDataError> {
        let body = self
            .get_json("/v7/finance/quote", &[("symbols", ticker.to_string())])
            .await?;
        parse_quote(ticker, &body)
    }

    async fn company_profile(&self, ticker: &str) -> Result<CompanyProfile, MarketDataError> {
        let summary = self.quote_summary(ticker, "assetProfile,price").await?;
        Ok(parse_profile(ticker, &summary))
    }

    async fn daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        let body = self
            .get_json(
                &format!("/v8/finance/chart/{}", ticker),
                &[
                    ("period1", epoch_seconds(start).to_string()),
                    ("period2", epoch_seconds(end).to_string()),
                    ("interval", "1d".to_string()),
                    ("events", "div,splits".to_string()),
                ],
            )
            .await?;

        let bars = parse_chart(ticker, &body)?;
        debug!("Fetched {} daily bars for {}", bars.len(), ticker);
        Ok(bars)
    }

    async fn quarterly_fundamentals(
        &self,
        ticker: &str,
    ) -> Result<Vec<QuarterlyFundamentals>, MarketDataError> {
        let summary = self
            .quote_summary(
                ticker,
                "incomeStatementHistoryQuarterly,balanceSheetHistoryQuarterly,cashflowStatementHistoryQuarterly",
            )
            .await?;
        Ok(parse_fundamentals(&summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_stub_server;
    use axum::{Json, Router, extract::Query, routing::get};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_quote_reads_raw_and_plain_numbers() {
        let body = json!({"quoteResponse": {"result": [{
            "regularMarketPrice": 189.5,
            "marketCap": {"raw": 2.9e12, "fmt": "2.9T"},
            "trailingPE": 29.1,
            "trailingAnnualDividendYield": 0.005,
            "fiftyTwoWeekHigh": 199.6,
            "fiftyTwoWeekLow": 164.1,
            "regularMarketVolume": 51234567
        }]}});

        let snapshot = parse_quote("AAPL", &body).unwrap();
        assert_eq!(snapshot.current_price, Some(189.5));
        assert_eq!(snapshot.market_cap, Some(2.9e12));
        assert_eq!(snapshot.volume, Some(51_234_567));

        let empty = json!({"quoteResponse": {"result": []}});
        assert!(matches!(parse_quote("NOPE", &empty), Err(MarketDataError::NotFound(_))));
    }

    #[test]
    fn test_profile_truncates_long_descriptions() {
        let summary = json!({
            "assetProfile": {"sector": "Technology", "industry": "Consumer Electronics",
                             "longBusinessSummary": "x".repeat(800)},
            "price": {"shortName": "Apple"}
        });

        let profile = parse_profile("AAPL", &summary);
        assert_eq!(profile.name.as_deref(), Some("Apple"));
        assert_eq!(profile.sector.as_deref(), Some("Technology"));
        assert_eq!(profile.description.map(|d| d.len()), Some(500));
    }

    #[test]
    fn test_fundamentals_merge_statements_by_quarter() {
        // 2024-03-31 and 2023-12-31 UTC
        let summary = json!({
            "incomeStatementHistoryQuarterly": {"incomeStatementHistory": [
                {"endDate": {"raw": 1711843200}, "totalRevenue": {"raw": 90.0e9}, "netIncome": {"raw": 23.6e9}},
                {"endDate": {"raw": 1703980800}, "totalRevenue": {"raw": 119.6e9}}
            ]},
            "balanceSheetHistoryQuarterly": {"balanceSheetStatements": [
                {"endDate": {"raw": 1711843200}, "totalAssets": {"raw": 337.4e9}, "totalLiab": {"raw": 263.2e9}}
            ]},
            "cashflowStatementHistoryQuarterly": {"cashflowStatements": [
                {"endDate": {"raw": 1711843200}, "totalCashFromOperatingActivities": {"raw": 22.7e9},
                 "capitalExpenditures": {"raw": -2.0e9}}
            ]}
        });

        let quarters = parse_fundamentals(&summary);

        assert_eq!(quarters.len(), 2);
        assert_eq!(quarters[0].period_end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(quarters[0].total_assets, Some(337.4e9));
        assert_eq!(quarters[0].free_cash_flow, Some(20.7e9));
        assert_eq!(quarters[1].revenue, Some(119.6e9));
        assert_eq!(quarters[1].total_assets, None);
    }

    #[tokio::test]
    async fn test_daily_history_over_http() {
        let router = Router::new().route(
            "/v8/finance/chart/{ticker}",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("interval").map(String::as_str), Some("1d"));
                Json(json!({"chart": {"result": [{
                    "timestamp": [1714660200, 1714573800],
                    "indicators": {
                        "quote": [{"open": [170.0, 169.0], "high": [173.0, 172.0],
                                   "low": [169.5, 168.0], "close": [173.0, null],
                                   "volume": [1000, 2000]}],
                        "adjclose": [{"adjclose": [172.8, null]}]
                    }
                }]}}))
            }),
        );
        let base_url = spawn_stub_server(router).await;
        let client = YahooFinanceClient::new(&base_url, 5).unwrap();

        let bars = client
            .daily_history(
                "AAPL",
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(bars[0].close, None);
        assert_eq!(bars[1].adj_close, Some(172.8));
        assert_eq!(bars[1].volume, Some(1000));
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_not_found() {
        let router = Router::new().route(
            "/v10/finance/quoteSummary/{ticker}",
            get(|| async {
                (
                    axum::http::StatusCode::NOT_FOUND,
                    Json(json!({"quoteSummary": {"result": null, "error": {"code": "Not Found"}}})),
                )
            }),
        );
        let base_url = spawn_stub_server(router).await;
        let client = YahooFinanceClient::new(&base_url, 5).unwrap();

        assert!(matches!(
            client.company_profile("ZZZZ").await,
            Err(MarketDataError::NotFound(_))
        ));
    }
}
