use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

use crate::application::use_cases::{
    GetQueryHistoryUseCase, ProcessQueryUseCase,
    get_query_history::{GetQueryHistoryError, GetQueryHistoryRequest},
    process_query::{ProcessQueryError, ProcessQueryRequest},
};
use crate::presentation::http::dto::{
    ApiResponse, HistoryParamsDto, HistoryResponseDto, QueryRequestDto, QueryResponseDto,
};

pub struct QueryHandler {
    process_query_use_case: Arc<ProcessQueryUseCase>,
    get_query_history_use_case: Arc<GetQueryHistoryUseCase>,
}

impl QueryHandler {
    pub fn new(
        process_query_use_case: Arc<ProcessQueryUseCase>,
        get_query_history_use_case: Arc<GetQueryHistoryUseCase>,
    ) -> Self {
        Self {
            process_query_use_case,
            get_query_history_use_case,
        }
    }

    pub async fn process_query(
        State(handler): State<Arc<QueryHandler>>,
        Json(payload): Json<QueryRequestDto>,
    ) -> Result<Response, StatusCode> {
        let request = ProcessQueryRequest {
            query: payload.query,
        };

        match handler.process_query_use_case.execute(request).await {
            Ok(outcome) => Ok((StatusCode::OK, Json(QueryResponseDto::from(outcome))).into_response()),
            Err(ProcessQueryError::ValidationError(message)) => Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(
                    "EMPTY_QUERY".to_string(),
                    message,
                    None,
                )),
            )
                .into_response()),
        }
    }

    pub async fn get_history(
        State(handler): State<Arc<QueryHandler>>,
        Query(params): Query<HistoryParamsDto>,
    ) -> Result<Response, StatusCode> {
        let request = GetQueryHistoryRequest {
            limit: params.limit,
            offset: params.offset,
        };

        match handler.get_query_history_use_case.execute(request).await {
            Ok(response) => {
                Ok((StatusCode::OK, Json(HistoryResponseDto::from(response))).into_response())
            }
            Err(GetQueryHistoryError::ValidationError(message)) => Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(
                    "INVALID_PARAMETERS".to_string(),
                    message,
                    None,
                )),
            )
                .into_response()),
            Err(e) => {
                error!("Failed to load query history: {}", e);
                Ok((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::error(
                        "HISTORY_FAILED".to_string(),
                        "Failed to load query history".to_string(),
                        Some(e.to_string()),
                    )),
                )
                    .into_response())
            }
        }
    }
}
