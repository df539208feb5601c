pub mod health_handler;
pub mod query_handler;
pub mod stats_handler;

pub use health_handler::HealthHandler;
pub use query_handler::QueryHandler;
pub use stats_handler::StatsHandler;
