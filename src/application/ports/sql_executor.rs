use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::value_objects::GeneratedSql;

#[derive(Debug, thiserror::Error)]
pub enum SqlExecutionError {
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("{0}")]
    ExecutionFailed(String),
    #[error("Invalid result: {0}")]
    InvalidResult(String),
}

pub type Row = Map<String, Value>;

/// Rows returned by a generated query, each keyed by column name in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryRows {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn head(&self, n: usize) -> &[Row] {
        &self.rows[..self.rows.len().min(n)]
    }
}

#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Runs the statement inside a read-only transaction.
    async fn execute_read_only(&self, sql: &GeneratedSql) -> Result<QueryRows, SqlExecutionError>;

    async fn ping(&self) -> Result<(), SqlExecutionError>;
}
