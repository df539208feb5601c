pub mod check_health;
pub mod get_platform_stats;
pub mod get_query_history;
pub mod index_schema;
pub mod process_query;
pub mod setup_data;

pub use check_health::CheckHealthUseCase;
pub use get_platform_stats::GetPlatformStatsUseCase;
pub use get_query_history::GetQueryHistoryUseCase;
pub use index_schema::IndexSchemaUseCase;
pub use process_query::ProcessQueryUseCase;
pub use setup_data::SetupDataUseCase;
