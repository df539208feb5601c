use async_trait::async_trait;
use diesel::prelude::*;
use pgvector::VectorExpressionMethods;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::ports::vector_index::{IndexStats, ScoredElement, VectorIndexError};
use crate::application::ports::{EmbeddingProvider, VectorIndex};
use crate::domain::entities::SchemaElement;
use crate::infrastructure::database::models::{NewSchemaEmbeddingModel, SchemaEmbeddingModel};
use crate::infrastructure::database::schema::schema_embeddings;
use crate::infrastructure::database::{DbPool, with_connection};
use crate::infrastructure::vector_store::{embed_batch, embed_query, l2_distance};

/// Schema index stored in the `schema_embeddings` table, searched with pgvector's `<->`.
pub struct PgVectorIndex {
    pool: DbPool,
    embedding_provider: Arc<dyn EmbeddingProvider>,
}

impl PgVectorIndex {
    pub fn new(pool: DbPool, embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            pool,
            embedding_provider,
        }
    }

    async fn count(&self) -> Result<usize, VectorIndexError> {
        let total: i64 = with_connection(&self.pool, |conn| {
            schema_embeddings::table.count().get_result(conn)
        })
        .await
        .map_err(|e| VectorIndexError::StorageError(e.to_string()))?;

        Ok(total as usize)
    }
}

#[async_trait]
impl VectorIndex for PgVectorIndex {
    async fn add_documents(&self, elements: Vec<SchemaElement>) -> Result<usize, VectorIndexError> {
        if elements.is_empty() {
            return Ok(0);
        }

        let texts = elements.iter().map(|e| e.text().to_string()).collect();
        let vectors = embed_batch(self.embedding_provider.as_ref(), texts).await?;

        let model_name = self.embedding_provider.model_name();
        let rows: Vec<NewSchemaEmbeddingModel> = elements
            .iter()
            .zip(vectors)
            .map(|(element, vector)| NewSchemaEmbeddingModel::new(element, &model_name, vector))
            .collect();

        let inserted = with_connection(&self.pool, move |conn| {
            diesel::insert_into(schema_embeddings::table)
                .values(&rows)
                .execute(conn)
        })
        .await
        .map_err(|e| VectorIndexError::StorageError(e.to_string()))?;

        info!("Stored {} schema embeddings", inserted);
        Ok(inserted)
    }

    async fn replace_all(&self, elements: Vec<SchemaElement>) -> Result<usize, VectorIndexError> {
        let rows = if elements.is_empty() {
            Vec::new()
        } else {
            let texts = elements.iter().map(|e| e.text().to_string()).collect();
            let vectors = embed_batch(self.embedding_provider.as_ref(), texts).await?;
            let model_name = self.embedding_provider.model_name();
            elements
                .iter()
                .zip(vectors)
                .map(|(element, vector)| NewSchemaEmbeddingModel::new(element, &model_name, vector))
                .collect::<Vec<_>>()
        };

        let inserted = with_connection(&self.pool, move |conn| {
            conn.transaction(|conn| {
                diesel::delete(schema_embeddings::table).execute(conn)?;
                if rows.is_empty() {
                    return Ok(0);
                }
                diesel::insert_into(schema_embeddings::table)
                    .values(&rows)
                    .execute(conn)
            })
        })
        .await
        .map_err(|e| VectorIndexError::StorageError(e.to_string()))?;

        info!("Replaced schema index with {} embeddings", inserted);
        Ok(inserted)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredElement>, VectorIndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = embed_query(self.embedding_provider.as_ref(), query).await?;
        let probe = query_vector.clone();

        let models = with_connection(&self.pool, move |conn| {
            schema_embeddings::table
                .order(schema_embeddings::embedding.l2_distance(probe))
                .limit(k as i64)
                .select(SchemaEmbeddingModel::as_select())
                .load(conn)
        })
        .await
        .map_err(|e| VectorIndexError::StorageError(e.to_string()))?;

        debug!("pgvector search returned {} hits for '{}'", models.len(), query);

        models
            .into_iter()
            .map(|model| {
                let distance = l2_distance(query_vector.as_slice(), model.embedding.as_slice());
                let element =
                    SchemaElement::try_from(model).map_err(VectorIndexError::StorageError)?;
                Ok(ScoredElement { element, distance })
            })
            .collect()
    }

    async fn clear(&self) -> Result<(), VectorIndexError> {
        with_connection(&self.pool, |conn| {
            diesel::delete(schema_embeddings::table).execute(conn)
        })
        .await
        .map_err(|e| VectorIndexError::StorageError(e.to_string()))?;

        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats, VectorIndexError> {
        let total = self.count().await?;
        Ok(IndexStats {
            total_documents: total,
            dimension: self.embedding_provider.embedding_dimension(),
            metadata_count: total,
        })
    }
}
