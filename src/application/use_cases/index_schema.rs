use std::sync::Arc;

use crate::application::ports::vector_index::IndexStats;
use crate::application::services::SchemaIndexer;

#[derive(Debug, thiserror::Error)]
pub enum IndexSchemaError {
    #[error("Indexing failed: {0}")]
    IndexingFailed(String),
}

#[derive(Debug, Clone)]
pub struct IndexSchemaResponse {
    pub indexed_elements: usize,
    pub stats: IndexStats,
}

pub struct IndexSchemaUseCase {
    schema_indexer: Arc<SchemaIndexer>,
}

impl IndexSchemaUseCase {
    pub fn new(schema_indexer: Arc<SchemaIndexer>) -> Self {
        Self { schema_indexer }
    }

    pub async fn execute(&self) -> Result<IndexSchemaResponse, IndexSchemaError> {
        let indexed_elements = self
            .schema_indexer
            .index_database_schema()
            .await
            .map_err(|e| IndexSchemaError::IndexingFailed(e.to_string()))?;

        let stats = self
            .schema_indexer
            .vector_index()
            .stats()
            .await
            .map_err(|e| IndexSchemaError::IndexingFailed(e.to_string()))?;

        Ok(IndexSchemaResponse {
            indexed_elements,
            stats,
        })
    }
}
