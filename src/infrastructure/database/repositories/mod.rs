pub mod postgres_financial_data_repository;
pub mod postgres_query_log_repository;
pub mod postgres_schema_catalog;
pub mod postgres_sql_executor;

pub use postgres_financial_data_repository::PostgresFinancialDataRepository;
pub use postgres_query_log_repository::PostgresQueryLogRepository;
pub use postgres_schema_catalog::PostgresSchemaCatalog;
pub use postgres_sql_executor::PostgresSqlExecutor;
