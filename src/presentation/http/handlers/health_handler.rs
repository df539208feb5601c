use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::application::use_cases::CheckHealthUseCase;
use crate::presentation::http::dto::{HealthResponseDto, RootResponseDto};

pub struct HealthHandler {
    check_health_use_case: Arc<CheckHealthUseCase>,
}

impl HealthHandler {
    pub fn new(check_health_use_case: Arc<CheckHealthUseCase>) -> Self {
        Self {
            check_health_use_case,
        }
    }

    pub async fn root() -> impl IntoResponse {
        (StatusCode::OK, Json(RootResponseDto::default()))
    }

    /// Always 200; an unreachable dependency is reported in the body.
    pub async fn health(State(handler): State<Arc<HealthHandler>>) -> impl IntoResponse {
        let report = handler.check_health_use_case.execute().await;
        (StatusCode::OK, Json(HealthResponseDto::from(report)))
    }
}
