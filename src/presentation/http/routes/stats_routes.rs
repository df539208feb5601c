use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::StatsHandler;

pub fn stats_routes(stats_handler: Arc<StatsHandler>) -> Router {
    Router::new()
        .route("/api/stats", get(StatsHandler::get_stats))
        .route("/api/index-schema", post(StatsHandler::index_schema))
        .with_state(stats_handler)
}
