pub mod health_routes;
pub mod query_routes;
pub mod stats_routes;

pub use health_routes::health_routes;
pub use query_routes::query_routes;
pub use stats_routes::stats_routes;
