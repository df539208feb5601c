pub mod financial_data_repository;
pub mod query_log_repository;

pub use financial_data_repository::FinancialDataRepository;
pub use query_log_repository::QueryLogRepository;
