use async_trait::async_trait;
use serde::Serialize;

use crate::domain::entities::SchemaElement;

#[derive(Debug, thiserror::Error)]
pub enum VectorIndexError {
    #[error("Embedding error: {0}")]
    EmbeddingError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub dimension: usize,
    pub metadata_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredElement {
    pub element: SchemaElement,
    /// Euclidean distance to the query; smaller is closer.
    pub distance: f32,
}

/// Similarity index over embedded schema elements.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Embeds the element texts and stores them; returns how many were added.
    async fn add_documents(&self, elements: Vec<SchemaElement>) -> Result<usize, VectorIndexError>;

    /// Nearest `k` elements by L2 distance, closest first. `k` is clamped to the index size.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredElement>, VectorIndexError>;

    /// Embeds `elements` and swaps them in for the whole index in one step.
    /// Concurrent readers see either the previous contents or the new ones.
    async fn replace_all(&self, elements: Vec<SchemaElement>) -> Result<usize, VectorIndexError>;

    async fn clear(&self) -> Result<(), VectorIndexError>;

    async fn stats(&self) -> Result<IndexStats, VectorIndexError>;
}
