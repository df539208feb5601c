use std::sync::Arc;
use tracing::{info, warn};

use crate::application::ports::vector_index::{ScoredElement, VectorIndexError};
use crate::application::ports::{SchemaCatalog, VectorIndex};
use crate::domain::entities::SchemaElement;

#[derive(Debug, thiserror::Error)]
pub enum SchemaIndexerError {
    #[error("Catalog error: {0}")]
    CatalogError(String),
    #[error("Index error: {0}")]
    IndexError(#[from] VectorIndexError),
}

/// Columns that matched a query, grouped under their table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableColumns {
    pub table: String,
    pub columns: Vec<String>,
}

/// Keeps the vector index in sync with the live schema and answers
/// "which tables/columns does this question talk about".
pub struct SchemaIndexer {
    catalog: Arc<dyn SchemaCatalog>,
    vector_index: Arc<dyn VectorIndex>,
}

impl SchemaIndexer {
    pub fn new(catalog: Arc<dyn SchemaCatalog>, vector_index: Arc<dyn VectorIndex>) -> Self {
        Self {
            catalog,
            vector_index,
        }
    }

    pub fn vector_index(&self) -> &Arc<dyn VectorIndex> {
        &self.vector_index
    }

    /// Rebuilds the index from scratch. Returns the number of elements indexed.
    pub async fn index_database_schema(&self) -> Result<usize, SchemaIndexerError> {
        let tables = self
            .catalog
            .list_tables()
            .await
            .map_err(|e| SchemaIndexerError::CatalogError(e.to_string()))?;

        let mut elements = Vec::new();
        for table in &tables {
            elements.push(SchemaElement::table(&table.name));
            for column in &table.columns {
                elements.push(SchemaElement::column(
                    &table.name,
                    &column.name,
                    &column.data_type,
                ));
            }
            for foreign_key in &table.foreign_keys {
                elements.push(SchemaElement::relationship(&table.name, foreign_key.clone()));
            }
        }

        if elements.is_empty() {
            warn!("Schema catalog returned no tables, nothing to index");
        }

        let indexed = self.vector_index.replace_all(elements).await?;
        info!("Indexed {} schema elements from {} tables", indexed, tables.len());

        Ok(indexed)
    }

    /// Distinct table names among the `k` nearest elements, closest first.
    pub async fn get_relevant_tables(&self, query: &str, k: usize) -> Vec<String> {
        let mut tables: Vec<String> = Vec::new();
        for hit in self.search_or_empty(query, k).await {
            let table = hit.element.table_name();
            if !tables.iter().any(|t| t == table) {
                tables.push(table.to_string());
            }
        }
        tables
    }

    /// Column hits among the `k` nearest elements, grouped by table in first-seen order.
    pub async fn get_relevant_columns(&self, query: &str, k: usize) -> Vec<TableColumns> {
        let mut grouped: Vec<TableColumns> = Vec::new();

        for hit in self.search_or_empty(query, k).await {
            let Some(column) = hit.element.column_name() else {
                continue;
            };
            let table = hit.element.table_name();

            let position = match grouped.iter().position(|g| g.table == table) {
                Some(position) => position,
                None => {
                    grouped.push(TableColumns {
                        table: table.to_string(),
                        columns: Vec::new(),
                    });
                    grouped.len() - 1
                }
            };

            let entry = &mut grouped[position];
            if !entry.columns.iter().any(|c| c == column) {
                entry.columns.push(column.to_string());
            }
        }

        grouped
    }

    // A failed lookup degrades to "no schema context" instead of failing the question.
    async fn search_or_empty(&self, query: &str, k: usize) -> Vec<ScoredElement> {
        match self.vector_index.search(query, k).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Schema search failed for '{}': {}", query, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::schema_catalog::TableInfo;
    use crate::infrastructure::vector_store::MemoryVectorIndex;
    use crate::test_support::{KeywordEmbeddingProvider, StaticSchemaCatalog};
    use std::time::Duration;

    fn indexer(catalog: StaticSchemaCatalog) -> SchemaIndexer {
        let index = MemoryVectorIndex::new(Arc::new(KeywordEmbeddingProvider::financial()), None);
        SchemaIndexer::new(Arc::new(catalog), Arc::new(index))
    }

    #[tokio::test]
    async fn test_indexes_tables_columns_and_relationships() {
        let indexer = indexer(StaticSchemaCatalog::financial());

        // 3 tables + 10 columns + 1 foreign key
        let indexed = indexer.index_database_schema().await.unwrap();
        assert_eq!(indexed, 14);

        let stats = indexer.vector_index().stats().await.unwrap();
        assert_eq!(stats.total_documents, 14);
    }

    #[tokio::test]
    async fn test_reindexing_does_not_duplicate() {
        let indexer = indexer(StaticSchemaCatalog::financial());

        indexer.index_database_schema().await.unwrap();
        indexer.index_database_schema().await.unwrap();

        let stats = indexer.vector_index().stats().await.unwrap();
        assert_eq!(stats.total_documents, 14);
    }

    #[tokio::test]
    async fn test_empty_catalog_indexes_nothing() {
        let indexer = indexer(StaticSchemaCatalog::new(Vec::<TableInfo>::new()));

        assert_eq!(indexer.index_database_schema().await.unwrap(), 0);
        assert!(indexer.get_relevant_tables("anything", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_relevant_tables_are_distinct() {
        let indexer = indexer(StaticSchemaCatalog::financial());
        indexer.index_database_schema().await.unwrap();

        let tables = indexer.get_relevant_tables("market data close price", 5).await;

        assert_eq!(tables.first().map(String::as_str), Some("market_data"));
        let mut deduped = tables.clone();
        deduped.dedup();
        assert_eq!(tables.len(), deduped.len());
    }

    #[tokio::test]
    async fn test_relevant_columns_grouped_by_table() {
        let indexer = indexer(StaticSchemaCatalog::financial());
        indexer.index_database_schema().await.unwrap();

        let columns = indexer.get_relevant_columns("ticker", 2).await;

        assert_eq!(
            columns,
            vec![
                TableColumns {
                    table: "companies".to_string(),
                    columns: vec!["ticker".to_string()],
                },
                TableColumns {
                    table: "market_data".to_string(),
                    columns: vec!["ticker".to_string()],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_search_failure_degrades_to_empty() {
        let index = MemoryVectorIndex::new(Arc::new(KeywordEmbeddingProvider::failing()), None);
        let indexer = SchemaIndexer::new(Arc::new(StaticSchemaCatalog::financial()), Arc::new(index));

        assert!(indexer.get_relevant_tables("revenue", 5).await.is_empty());
        assert!(indexer.get_relevant_columns("revenue", 10).await.is_empty());
    }

    fn slow_indexer() -> Arc<SchemaIndexer> {
        let provider =
            KeywordEmbeddingProvider::financial().with_batch_delay(Duration::from_millis(50));
        let index = MemoryVectorIndex::new(Arc::new(provider), None);
        Arc::new(SchemaIndexer::new(
            Arc::new(StaticSchemaCatalog::financial()),
            Arc::new(index),
        ))
    }

    #[tokio::test]
    async fn test_overlapping_reindex_does_not_duplicate() {
        let indexer = slow_indexer();

        let (first, second) = tokio::join!(
            indexer.index_database_schema(),
            indexer.index_database_schema()
        );
        assert_eq!(first.unwrap(), 14);
        assert_eq!(second.unwrap(), 14);

        let stats = indexer.vector_index().stats().await.unwrap();
        assert_eq!(stats.total_documents, 14);
    }

    #[tokio::test]
    async fn test_lookups_during_reindex_see_previous_index() {
        let indexer = slow_indexer();
        indexer.index_database_schema().await.unwrap();

        let reindexing = tokio::spawn({
            let indexer = indexer.clone();
            async move { indexer.index_database_schema().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let tables = indexer.get_relevant_tables("market data close price", 5).await;
        assert_eq!(tables.first().map(String::as_str), Some("market_data"));

        assert_eq!(reindexing.await.unwrap().unwrap(), 14);
    }
}
