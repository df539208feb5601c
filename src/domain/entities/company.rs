use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    id: Option<i32>,
    name: String,
    ticker: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
    description: Option<String>,
    founded_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

const MAX_DESCRIPTION_CHARS: usize = 500;

impl Company {
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            ticker: None,
            sector: None,
            industry: None,
            description: None,
            founded_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_ticker(mut self, ticker: Option<String>) -> Self {
        self.ticker = ticker.map(|t| t.trim().to_uppercase()).filter(|t| !t.is_empty());
        self
    }

    pub fn with_classification(mut self, sector: Option<String>, industry: Option<String>) -> Self {
        self.sector = sector;
        self.industry = industry;
        self
    }

    /// Long business summaries are cut to 500 characters.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description
            .filter(|d| !d.trim().is_empty())
            .map(|d| d.chars().take(MAX_DESCRIPTION_CHARS).collect());
        self
    }

    pub fn with_founded_date(mut self, founded_date: Option<NaiveDate>) -> Self {
        self.founded_date = founded_date;
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_database(
        id: i32,
        name: String,
        ticker: Option<String>,
        sector: Option<String>,
        industry: Option<String>,
        description: Option<String>,
        founded_date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            ticker,
            sector,
            industry,
            description,
            founded_date,
            created_at,
        }
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    pub fn industry(&self) -> Option<&str> {
        self.industry.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn founded_date(&self) -> Option<NaiveDate> {
        self.founded_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_is_normalized() {
        let company = Company::new("Apple Inc.".to_string()).with_ticker(Some(" aapl ".to_string()));
        assert_eq!(company.ticker(), Some("AAPL"));

        let no_ticker = Company::new("Private Co".to_string()).with_ticker(Some("  ".to_string()));
        assert_eq!(no_ticker.ticker(), None);
    }

    #[test]
    fn test_description_is_truncated() {
        let long = "x".repeat(800);
        let company = Company::new("Verbose Corp".to_string()).with_description(Some(long));
        assert_eq!(company.description().map(|d| d.chars().count()), Some(500));
    }
}
