pub mod memory_index;
pub mod pgvector_index;

pub use memory_index::MemoryVectorIndex;
pub use pgvector_index::PgVectorIndex;

use pgvector::Vector;

use crate::application::ports::EmbeddingProvider;
use crate::application::ports::embedding_provider::BatchEmbeddingRequest;
use crate::application::ports::vector_index::VectorIndexError;

pub(crate) fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Embeds `texts` in one batch and checks every vector has the provider's dimension.
pub(crate) async fn embed_batch(
    provider: &dyn EmbeddingProvider,
    texts: Vec<String>,
) -> Result<Vec<Vector>, VectorIndexError> {
    let expected_len = texts.len();
    let response = provider
        .generate_embeddings(BatchEmbeddingRequest {
            texts,
            model_name: None,
        })
        .await
        .map_err(|e| VectorIndexError::EmbeddingError(e.to_string()))?;

    if response.embeddings.len() != expected_len {
        return Err(VectorIndexError::EmbeddingError(format!(
            "expected {} embeddings, got {}",
            expected_len,
            response.embeddings.len()
        )));
    }

    let dimension = provider.embedding_dimension();
    if let Some(bad) = response
        .embeddings
        .iter()
        .find(|v| v.as_slice().len() != dimension)
    {
        return Err(VectorIndexError::DimensionMismatch {
            expected: dimension,
            actual: bad.as_slice().len(),
        });
    }

    Ok(response.embeddings)
}

pub(crate) async fn embed_query(
    provider: &dyn EmbeddingProvider,
    query: &str,
) -> Result<Vector, VectorIndexError> {
    let mut vectors = embed_batch(provider, vec![query.to_string()]).await?;
    vectors
        .pop()
        .ok_or_else(|| VectorIndexError::EmbeddingError("empty embedding response".to_string()))
}
