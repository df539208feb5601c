use serde::Serialize;

use crate::application::ports::vector_index::IndexStats;
use crate::application::use_cases::check_health::HealthReport;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn error(code: String, message: String, details: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message,
                details,
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EndpointsDto {
    pub query: &'static str,
    pub history: &'static str,
    pub stats: &'static str,
    pub health: &'static str,
    pub index_schema: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RootResponseDto {
    pub message: String,
    pub version: String,
    pub endpoints: EndpointsDto,
}

impl Default for RootResponseDto {
    fn default() -> Self {
        Self {
            message: "FinQuery API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            endpoints: EndpointsDto {
                query: "/api/query",
                history: "/api/history",
                stats: "/api/stats",
                health: "/api/health",
                index_schema: "/api/index-schema",
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponseDto {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_store: Option<IndexStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<HealthReport> for HealthResponseDto {
    fn from(report: HealthReport) -> Self {
        match report {
            HealthReport::Healthy { vector_store } => Self {
                status: "healthy".to_string(),
                database: Some("connected".to_string()),
                vector_store: Some(vector_store),
                error: None,
            },
            HealthReport::Unhealthy { error } => Self {
                status: "unhealthy".to_string(),
                database: None,
                vector_store: None,
                error: Some(error),
            },
        }
    }
}
