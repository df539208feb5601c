use async_trait::async_trait;

use crate::domain::entities::ForeignKey;

#[derive(Debug, thiserror::Error)]
pub enum SchemaCatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub foreign_keys: Vec<ForeignKey>,
}

/// Live description of the queryable relational schema.
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    async fn list_tables(&self) -> Result<Vec<TableInfo>, SchemaCatalogError>;
}
