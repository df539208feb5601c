use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::application::ports::vector_index::{IndexStats, ScoredElement, VectorIndexError};
use crate::application::ports::{EmbeddingProvider, VectorIndex};
use crate::domain::entities::SchemaElement;
use crate::infrastructure::vector_store::{embed_batch, embed_query, l2_distance};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexedElement {
    element: SchemaElement,
    vector: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    model_name: String,
    dimension: usize,
    entries: Vec<IndexedElement>,
}

/// Flat exact-L2 index held in memory. With a path configured, every
/// change is written to `<path>.json` and reloaded on startup.
pub struct MemoryVectorIndex {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    path: Option<PathBuf>,
    entries: RwLock<Vec<IndexedElement>>,
}

impl MemoryVectorIndex {
    pub fn new(embedding_provider: Arc<dyn EmbeddingProvider>, path: Option<PathBuf>) -> Self {
        Self {
            embedding_provider,
            path,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Opens the index at `path`, loading a previous snapshot if one exists.
    /// Snapshots built with a different embedding dimension are discarded.
    pub async fn open(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        path: PathBuf,
    ) -> Result<Self, VectorIndexError> {
        let index = Self::new(embedding_provider, Some(path));
        let snapshot_path = index.snapshot_path().unwrap_or_default();

        match tokio::fs::read_to_string(&snapshot_path).await {
            Ok(contents) => {
                let snapshot: Snapshot = serde_json::from_str(&contents)
                    .map_err(|e| VectorIndexError::StorageError(e.to_string()))?;
                let dimension = index.embedding_provider.embedding_dimension();

                if snapshot.dimension != dimension {
                    warn!(
                        "Ignoring schema index at {} built with dimension {} (expected {})",
                        snapshot_path.display(),
                        snapshot.dimension,
                        dimension
                    );
                } else {
                    info!(
                        "Loaded {} schema elements ({}) from {}",
                        snapshot.entries.len(),
                        snapshot.model_name,
                        snapshot_path.display()
                    );
                    *index.entries.write().await = snapshot.entries;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No schema index at {}, starting empty", snapshot_path.display());
            }
            Err(e) => return Err(VectorIndexError::StorageError(e.to_string())),
        }

        Ok(index)
    }

    fn snapshot_path(&self) -> Option<PathBuf> {
        self.path.as_ref().map(|p| {
            let mut name = p.as_os_str().to_owned();
            name.push(".json");
            PathBuf::from(name)
        })
    }

    async fn persist(&self, entries: &[IndexedElement]) -> Result<(), VectorIndexError> {
        let Some(path) = self.snapshot_path() else {
            return Ok(());
        };

        let snapshot = SnapshotRef {
            model_name: self.embedding_provider.model_name(),
            dimension: self.embedding_provider.embedding_dimension(),
            entries,
        };
        let json = serde_json::to_string(&snapshot)
            .map_err(|e| VectorIndexError::StorageError(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| storage_error(&path, e))
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    model_name: String,
    dimension: usize,
    entries: &'a [IndexedElement],
}

fn storage_error(path: &Path, error: std::io::Error) -> VectorIndexError {
    VectorIndexError::StorageError(format!("{}: {}", path.display(), error))
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn add_documents(&self, elements: Vec<SchemaElement>) -> Result<usize, VectorIndexError> {
        if elements.is_empty() {
            return Ok(0);
        }

        let texts = elements.iter().map(|e| e.text().to_string()).collect();
        let vectors = embed_batch(self.embedding_provider.as_ref(), texts).await?;
        let added = elements.len();

        let mut entries = self.entries.write().await;
        entries.extend(
            elements
                .into_iter()
                .zip(vectors)
                .map(|(element, vector)| IndexedElement {
                    element,
                    vector: vector.to_vec(),
                }),
        );
        self.persist(&entries).await?;

        Ok(added)
    }

    async fn replace_all(&self, elements: Vec<SchemaElement>) -> Result<usize, VectorIndexError> {
        let vectors = if elements.is_empty() {
            Vec::new()
        } else {
            let texts = elements.iter().map(|e| e.text().to_string()).collect();
            embed_batch(self.embedding_provider.as_ref(), texts).await?
        };

        let replacement: Vec<IndexedElement> = elements
            .into_iter()
            .zip(vectors)
            .map(|(element, vector)| IndexedElement {
                element,
                vector: vector.to_vec(),
            })
            .collect();
        let replaced = replacement.len();

        let mut entries = self.entries.write().await;
        *entries = replacement;
        self.persist(&entries).await?;

        Ok(replaced)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredElement>, VectorIndexError> {
        if k == 0 || self.entries.read().await.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = embed_query(self.embedding_provider.as_ref(), query).await?;
        let entries = self.entries.read().await;

        let mut scored: Vec<ScoredElement> = entries
            .iter()
            .map(|entry| ScoredElement {
                element: entry.element.clone(),
                distance: l2_distance(query_vector.as_slice(), &entry.vector),
            })
            .collect();
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(k);

        Ok(scored)
    }

    async fn clear(&self) -> Result<(), VectorIndexError> {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.persist(&entries).await
    }

    async fn stats(&self) -> Result<IndexStats, VectorIndexError> {
        let total = self.entries.read().await.len();
        Ok(IndexStats {
            total_documents: total,
            dimension: self.embedding_provider.embedding_dimension(),
            metadata_count: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::KeywordEmbeddingProvider;

    fn provider() -> Arc<dyn EmbeddingProvider> {
        Arc::new(KeywordEmbeddingProvider::financial())
    }

    fn elements() -> Vec<SchemaElement> {
        vec![
            SchemaElement::table("companies"),
            SchemaElement::column("companies", "sector", "character varying"),
            SchemaElement::column("market_data", "close_price", "double precision"),
        ]
    }

    #[tokio::test]
    async fn test_search_orders_by_distance_and_clamps_k() {
        let index = MemoryVectorIndex::new(provider(), None);
        index.add_documents(elements()).await.unwrap();

        let hits = index.search("market close price", 10).await.unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].element.column_name(), Some("close_price"));
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn test_empty_index_skips_embedding() {
        let index = MemoryVectorIndex::new(Arc::new(KeywordEmbeddingProvider::failing()), None);

        assert!(index.search("anything", 5).await.unwrap().is_empty());
        assert_eq!(index.stats().await.unwrap().total_documents, 0);
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexes").join("schema");

        let index = MemoryVectorIndex::open(provider(), path.clone()).await.unwrap();
        index.add_documents(elements()).await.unwrap();
        assert!(dir.path().join("indexes").join("schema.json").exists());

        let reopened = MemoryVectorIndex::open(provider(), path).await.unwrap();
        let stats = reopened.stats().await.unwrap();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.dimension, 16);

        let hits = reopened.search("company sector", 1).await.unwrap();
        assert_eq!(hits[0].element.column_name(), Some("sector"));
    }

    #[tokio::test]
    async fn test_snapshot_with_other_dimension_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema");

        let small = MemoryVectorIndex::open(
            Arc::new(KeywordEmbeddingProvider::new(&["companies", "sector"])),
            path.clone(),
        )
        .await
        .unwrap();
        small.add_documents(elements()).await.unwrap();

        let reopened = MemoryVectorIndex::open(provider(), path).await.unwrap();
        assert_eq!(reopened.stats().await.unwrap().total_documents, 0);
    }

    #[tokio::test]
    async fn test_clear_empties_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema");

        let index = MemoryVectorIndex::open(provider(), path.clone()).await.unwrap();
        index.add_documents(elements()).await.unwrap();
        index.clear().await.unwrap();

        let reopened = MemoryVectorIndex::open(provider(), path).await.unwrap();
        assert_eq!(reopened.stats().await.unwrap().total_documents, 0);
    }

    #[tokio::test]
    async fn test_replace_all_swaps_contents_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema");

        let index = MemoryVectorIndex::open(provider(), path.clone()).await.unwrap();
        index.add_documents(elements()).await.unwrap();

        let replaced = index
            .replace_all(vec![SchemaElement::table("portfolio_companies")])
            .await
            .unwrap();
        assert_eq!(replaced, 1);

        let reopened = MemoryVectorIndex::open(provider(), path).await.unwrap();
        let hits = reopened.search("companies", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].element.table_name(), "portfolio_companies");
    }

    #[tokio::test]
    async fn test_replace_all_with_nothing_empties_without_embedding() {
        let index = MemoryVectorIndex::new(Arc::new(KeywordEmbeddingProvider::failing()), None);

        assert_eq!(index.replace_all(Vec::new()).await.unwrap(), 0);
        assert_eq!(index.stats().await.unwrap().total_documents, 0);
    }
}
