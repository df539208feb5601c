use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::presentation::http::{
    handlers::{HealthHandler, QueryHandler, StatsHandler},
    routes::{health_routes, query_routes, stats_routes},
};

const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

pub struct HttpServer {
    query_handler: Arc<QueryHandler>,
    stats_handler: Arc<StatsHandler>,
    health_handler: Arc<HealthHandler>,
    host: [u8; 4],
    port: u16,
}

impl HttpServer {
    pub fn new(
        query_handler: Arc<QueryHandler>,
        stats_handler: Arc<StatsHandler>,
        health_handler: Arc<HealthHandler>,
        host: [u8; 4],
        port: u16,
    ) -> Self {
        Self {
            query_handler,
            stats_handler,
            health_handler,
            host,
            port,
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .merge(health_routes(self.health_handler.clone()))
            .merge(query_routes(self.query_handler.clone()))
            .merge(stats_routes(self.stats_handler.clone()))
            .layer(cors)
            .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                "Request failed: {:?} (took {} ms)",
                                error,
                                latency.as_millis()
                            );
                        },
                    ),
            )
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = SocketAddr::from((self.host, self.port));

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("FinQuery API listening on {}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
