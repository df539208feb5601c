use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::{error, info};

use crate::application::use_cases::{GetPlatformStatsUseCase, IndexSchemaUseCase};
use crate::presentation::http::dto::{ApiResponse, IndexSchemaResponseDto, StatsResponseDto};

pub struct StatsHandler {
    get_platform_stats_use_case: Arc<GetPlatformStatsUseCase>,
    index_schema_use_case: Arc<IndexSchemaUseCase>,
}

impl StatsHandler {
    pub fn new(
        get_platform_stats_use_case: Arc<GetPlatformStatsUseCase>,
        index_schema_use_case: Arc<IndexSchemaUseCase>,
    ) -> Self {
        Self {
            get_platform_stats_use_case,
            index_schema_use_case,
        }
    }

    pub async fn get_stats(
        State(handler): State<Arc<StatsHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.get_platform_stats_use_case.execute().await {
            Ok(stats) => Ok(Json(StatsResponseDto::from(stats)).into_response()),
            Err(e) => {
                error!("Failed to collect platform stats: {}", e);
                Ok((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::error(
                        "STATS_FAILED".to_string(),
                        e.to_string(),
                        None,
                    )),
                )
                    .into_response())
            }
        }
    }

    pub async fn index_schema(
        State(handler): State<Arc<StatsHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.index_schema_use_case.execute().await {
            Ok(response) => {
                info!("Re-indexed {} schema elements", response.indexed_elements);
                Ok(Json(IndexSchemaResponseDto::from(response)).into_response())
            }
            Err(e) => {
                error!("Schema indexing failed: {}", e);
                Ok((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::error(
                        "INDEXING_FAILED".to_string(),
                        e.to_string(),
                        None,
                    )),
                )
                    .into_response())
            }
        }
    }
}
