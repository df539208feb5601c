use serde::Serialize;

use crate::application::ports::vector_index::IndexStats;
use crate::application::use_cases::get_platform_stats::PlatformStats;
use crate::application::use_cases::index_schema::IndexSchemaResponse;
use crate::domain::repositories::financial_data_repository::TableCounts;

#[derive(Debug, Serialize)]
pub struct QueryStatsDto {
    pub total: i64,
    pub successful: i64,
    pub success_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponseDto {
    pub queries: QueryStatsDto,
    pub database: TableCounts,
    pub vector_store: IndexStats,
}

impl From<PlatformStats> for StatsResponseDto {
    fn from(stats: PlatformStats) -> Self {
        Self {
            queries: QueryStatsDto {
                total: stats.total_queries,
                successful: stats.successful_queries,
                success_rate: stats.success_rate,
            },
            database: stats.table_counts,
            vector_store: stats.vector_store,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexSchemaResponseDto {
    pub success: bool,
    pub message: String,
    pub indexed_elements: usize,
    pub stats: IndexStats,
}

impl From<IndexSchemaResponse> for IndexSchemaResponseDto {
    fn from(response: IndexSchemaResponse) -> Self {
        Self {
            success: true,
            message: "Database schema indexed successfully".to_string(),
            indexed_elements: response.indexed_elements,
            stats: response.stats,
        }
    }
}
