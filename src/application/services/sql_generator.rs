use std::sync::Arc;
use tracing::{debug, warn};

use crate::application::ports::LanguageModel;
use crate::application::ports::language_model::ChatRequest;
use crate::application::services::schema_indexer::TableColumns;
use crate::domain::value_objects::{GeneratedSql, SqlValidationError};

const GENERATION_TEMPERATURE: f32 = 0.1;
const GENERATION_MAX_TOKENS: u32 = 500;
const EXPLANATION_TEMPERATURE: f32 = 0.3;
const EXPLANATION_MAX_TOKENS: u32 = 200;

const GENERATION_SYSTEM_PROMPT: &str = "You are an expert SQL query generator. \
Return only valid PostgreSQL queries without any formatting or explanations.";

const EXPLANATION_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that explains SQL queries and results in plain English.";

#[derive(Debug, thiserror::Error)]
pub enum SqlGenerationError {
    #[error("Language model error: {0}")]
    ModelError(String),
    #[error("Rejected SQL: {0}")]
    Rejected(#[from] SqlValidationError),
}

/// Turns a question plus retrieved schema context into a single read-only statement.
pub struct SqlGenerator {
    language_model: Arc<dyn LanguageModel>,
}

impl SqlGenerator {
    pub fn new(language_model: Arc<dyn LanguageModel>) -> Self {
        Self { language_model }
    }

    pub async fn generate_sql(
        &self,
        query: &str,
        tables: &[String],
        table_columns: &[TableColumns],
    ) -> Result<GeneratedSql, SqlGenerationError> {
        let schema_context = Self::format_schema_context(tables, table_columns);
        let prompt = format!(
            "You are an expert SQL query generator. Given a natural language question and \
database schema information, generate a valid PostgreSQL query.

Database Schema:
{schema_context}

Additional Context:
- The database contains financial data for companies and portfolio investments
- Use appropriate JOINs when querying multiple tables
- Use aggregations (SUM, AVG, COUNT) when appropriate
- Format dates properly using PostgreSQL date functions
- Return only the SQL query, no explanations

Question: {query}

Generate a valid PostgreSQL query to answer this question. Return ONLY the SQL query \
without any markdown formatting or explanations."
        );

        let request = ChatRequest::new(GENERATION_SYSTEM_PROMPT, prompt)
            .with_temperature(GENERATION_TEMPERATURE)
            .with_max_tokens(GENERATION_MAX_TOKENS);

        let response = self
            .language_model
            .complete(request)
            .await
            .map_err(|e| SqlGenerationError::ModelError(e.to_string()))?;

        debug!("Raw SQL completion: {}", response.content);

        GeneratedSql::parse(&response.content).map_err(|e| {
            warn!("Discarding generated SQL: {}", e);
            SqlGenerationError::from(e)
        })
    }

    /// One line per table; tables without retrieved columns are listed bare.
    pub fn format_schema_context(tables: &[String], table_columns: &[TableColumns]) -> String {
        tables
            .iter()
            .map(|table| {
                match table_columns
                    .iter()
                    .find(|g| &g.table == table && !g.columns.is_empty())
                {
                    Some(group) => {
                        format!("Table '{}': columns ({})", table, group.columns.join(", "))
                    }
                    None => format!("Table '{}'", table),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Short plain-English explanation of a statement and its result.
    pub async fn explain_query(&self, sql: &str, result: &str) -> String {
        let prompt = format!(
            "Given this SQL query and its result, provide a clear, concise explanation in plain English.

SQL Query:
{sql}

Result:
{result}

Provide a brief explanation of what the query does and what the result means. \
Keep it under 2 sentences."
        );

        let request = ChatRequest::new(EXPLANATION_SYSTEM_PROMPT, prompt)
            .with_temperature(EXPLANATION_TEMPERATURE)
            .with_max_tokens(EXPLANATION_MAX_TOKENS);

        match self.language_model.complete(request).await {
            Ok(response) => response.content.trim().to_string(),
            Err(e) => {
                warn!("Query explanation failed: {}", e);
                format!("Query executed successfully. Result: {}", result)
            }
        }
    }
}
