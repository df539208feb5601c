use std::sync::Arc;
use tracing::warn;

use crate::application::ports::vector_index::IndexStats;
use crate::application::ports::{SqlExecutor, VectorIndex};

#[derive(Debug, Clone, PartialEq)]
pub enum HealthReport {
    Healthy { vector_store: IndexStats },
    Unhealthy { error: String },
}

pub struct CheckHealthUseCase {
    sql_executor: Arc<dyn SqlExecutor>,
    vector_index: Arc<dyn VectorIndex>,
}

impl CheckHealthUseCase {
    pub fn new(sql_executor: Arc<dyn SqlExecutor>, vector_index: Arc<dyn VectorIndex>) -> Self {
        Self {
            sql_executor,
            vector_index,
        }
    }

    pub async fn execute(&self) -> HealthReport {
        if let Err(e) = self.sql_executor.ping().await {
            warn!("Health check: database unreachable: {}", e);
            return HealthReport::Unhealthy {
                error: e.to_string(),
            };
        }

        match self.vector_index.stats().await {
            Ok(vector_store) => HealthReport::Healthy { vector_store },
            Err(e) => {
                warn!("Health check: vector store unavailable: {}", e);
                HealthReport::Unhealthy {
                    error: e.to_string(),
                }
            }
        }
    }
}
