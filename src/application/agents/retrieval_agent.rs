use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::agents::reasoning::{Agent, QueryContext, ReasoningLog};
use crate::application::ports::SqlExecutor;
use crate::application::ports::sql_executor::QueryRows;
use crate::application::services::schema_indexer::TableColumns;
use crate::application::services::{SchemaIndexer, SqlGenerator};
use crate::domain::entities::ReasoningStep;
use crate::domain::value_objects::GeneratedSql;

#[derive(Debug, Clone)]
pub struct RetrievalOutput {
    pub sql: GeneratedSql,
    pub rows: QueryRows,
    pub relevant_tables: Vec<String>,
    pub reasoning: Vec<ReasoningStep>,
}

impl RetrievalOutput {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone)]
pub struct RetrievalFailure {
    pub error: String,
    /// Present when the statement was generated but failed to run.
    pub sql: Option<GeneratedSql>,
    pub reasoning: Vec<ReasoningStep>,
}

/// Question -> relevant schema -> SQL -> rows.
pub struct RetrievalAgent {
    schema_indexer: Arc<SchemaIndexer>,
    sql_generator: Arc<SqlGenerator>,
    sql_executor: Arc<dyn SqlExecutor>,
    table_k: usize,
    column_k: usize,
}

impl RetrievalAgent {
    pub const NAME: &'static str = "RetrievalAgent";

    pub fn new(
        schema_indexer: Arc<SchemaIndexer>,
        sql_generator: Arc<SqlGenerator>,
        sql_executor: Arc<dyn SqlExecutor>,
        table_k: usize,
        column_k: usize,
    ) -> Self {
        Self {
            schema_indexer,
            sql_generator,
            sql_executor,
            table_k,
            column_k,
        }
    }
}

fn columns_by_table(groups: &[TableColumns]) -> Value {
    let map: Map<String, Value> = groups
        .iter()
        .map(|g| (g.table.clone(), json!(g.columns)))
        .collect();
    Value::Object(map)
}

#[async_trait]
impl Agent for RetrievalAgent {
    type Output = Result<RetrievalOutput, RetrievalFailure>;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn execute(&self, context: &QueryContext<'_>) -> Self::Output {
        let mut reasoning = ReasoningLog::new(Self::NAME);
        reasoning.log("query_received", context.query);

        let relevant_tables = self
            .schema_indexer
            .get_relevant_tables(context.query, self.table_k)
            .await;
        let table_columns = self
            .schema_indexer
            .get_relevant_columns(context.query, self.column_k)
            .await;

        reasoning.log(
            "schema_retrieval",
            json!({
                "relevant_tables": relevant_tables,
                "table_columns": columns_by_table(&table_columns),
            }),
        );

        let sql = match self
            .sql_generator
            .generate_sql(context.query, &relevant_tables, &table_columns)
            .await
        {
            Ok(sql) => sql,
            Err(e) => {
                warn!("SQL generation failed: {}", e);
                reasoning.log("sql_generation_failed", e.to_string());
                return Err(RetrievalFailure {
                    error: "Failed to generate SQL query".to_string(),
                    sql: None,
                    reasoning: reasoning.into_steps(),
                });
            }
        };

        reasoning.log("sql_generated", sql.as_str());

        match self.sql_executor.execute_read_only(&sql).await {
            Ok(rows) => {
                info!("Query returned {} rows", rows.len());
                reasoning.log(
                    "query_executed",
                    json!({
                        "rows_returned": rows.len(),
                        "columns": rows.columns,
                    }),
                );

                Ok(RetrievalOutput {
                    sql,
                    rows,
                    relevant_tables,
                    reasoning: reasoning.into_steps(),
                })
            }
            Err(e) => {
                warn!("Generated SQL failed to execute: {}", e);
                reasoning.log("query_execution_failed", e.to_string());

                Err(RetrievalFailure {
                    error: format!("Query execution failed: {}", e),
                    sql: Some(sql),
                    reasoning: reasoning.into_steps(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::vector_store::MemoryVectorIndex;
    use crate::test_support::{
        FakeSqlExecutor, KeywordEmbeddingProvider, ScriptedLanguageModel, StaticSchemaCatalog,
    };

    async fn agent(model: ScriptedLanguageModel, executor: Arc<FakeSqlExecutor>) -> RetrievalAgent {
        let index = MemoryVectorIndex::new(Arc::new(KeywordEmbeddingProvider::financial()), None);
        let indexer = SchemaIndexer::new(Arc::new(StaticSchemaCatalog::financial()), Arc::new(index));
        indexer.index_database_schema().await.unwrap();

        RetrievalAgent::new(
            Arc::new(indexer),
            Arc::new(SqlGenerator::new(Arc::new(model))),
            executor,
            5,
            10,
        )
    }

    fn steps(reasoning: &[ReasoningStep]) -> Vec<&str> {
        reasoning.iter().map(|s| s.step.as_str()).collect()
    }

    #[tokio::test]
    async fn test_successful_retrieval() {
        let executor = Arc::new(FakeSqlExecutor::returning(vec![
            json!({"name": "Apple Inc.", "ticker": "AAPL"}),
            json!({"name": "Microsoft", "ticker": "MSFT"}),
        ]));
        let agent = agent(
            ScriptedLanguageModel::replying(&["SELECT name, ticker FROM companies"]),
            executor.clone(),
        )
        .await;

        let output = agent
            .execute(&QueryContext::new("show company ticker"))
            .await
            .unwrap();

        assert_eq!(output.sql.as_str(), "SELECT name, ticker FROM companies");
        assert_eq!(output.row_count(), 2);
        assert!(output.relevant_tables.contains(&"companies".to_string()));
        assert_eq!(
            steps(&output.reasoning),
            vec!["query_received", "schema_retrieval", "sql_generated", "query_executed"]
        );
        assert_eq!(output.reasoning[3].details["rows_returned"], 2);
        assert_eq!(executor.executed(), vec!["SELECT name, ticker FROM companies"]);
    }

    #[tokio::test]
    async fn test_generation_failure() {
        let executor = Arc::new(FakeSqlExecutor::returning(Vec::new()));
        let agent = agent(
            ScriptedLanguageModel::replying(&["DELETE FROM companies"]),
            executor.clone(),
        )
        .await;

        let failure = agent
            .execute(&QueryContext::new("remove everything"))
            .await
            .unwrap_err();

        assert_eq!(failure.error, "Failed to generate SQL query");
        assert!(failure.sql.is_none());
        assert_eq!(steps(&failure.reasoning).last(), Some(&"sql_generation_failed"));
        assert!(executor.executed().is_empty());
    }

    #[tokio::test]
    async fn test_execution_failure_keeps_sql() {
        let executor = Arc::new(FakeSqlExecutor::failing(
            "relation \"nonexistent\" does not exist",
        ));
        let agent = agent(
            ScriptedLanguageModel::replying(&["SELECT * FROM nonexistent"]),
            executor,
        )
        .await;

        let failure = agent
            .execute(&QueryContext::new("show revenue"))
            .await
            .unwrap_err();

        assert_eq!(
            failure.error,
            "Query execution failed: relation \"nonexistent\" does not exist"
        );
        assert_eq!(
            failure.sql.as_ref().map(GeneratedSql::as_str),
            Some("SELECT * FROM nonexistent")
        );
        assert_eq!(steps(&failure.reasoning).last(), Some(&"query_execution_failed"));
    }
}
