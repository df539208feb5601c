pub mod company;
pub mod financial_records;
pub mod query_log;
pub mod reasoning_step;
pub mod schema_element;

pub use company::Company;
pub use financial_records::{FinancialStatement, MarketData, PerformanceMetric, PortfolioCompany};
pub use query_log::QueryLog;
pub use reasoning_step::ReasoningStep;
pub use schema_element::{ForeignKey, SchemaElement, SchemaElementKind};
