use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_types::Text;
use serde_json::Value;

use crate::application::ports::SqlExecutor;
use crate::application::ports::sql_executor::{QueryRows, Row, SqlExecutionError};
use crate::domain::value_objects::GeneratedSql;
use crate::infrastructure::database::{DatabaseError, DbPool, with_connection};

#[derive(Debug, QueryableByName)]
struct JsonRow {
    #[diesel(sql_type = Text)]
    row: String,
}

/// Runs generated SQL in a read-only transaction with a statement timeout,
/// serializing each row to JSON on the server so arbitrary result shapes
/// come back without a compile-time row type.
pub struct PostgresSqlExecutor {
    pool: DbPool,
    statement_timeout_ms: u64,
}

impl PostgresSqlExecutor {
    pub fn new(pool: DbPool, statement_timeout_ms: u64) -> Self {
        Self {
            pool,
            statement_timeout_ms,
        }
    }
}

fn wrap_statement(sql: &GeneratedSql) -> String {
    format!("SELECT row_to_json(q)::text AS row FROM (\n{}\n) AS q", sql)
}

fn execution_error(error: DatabaseError) -> SqlExecutionError {
    match error {
        DatabaseError::QueryError(DieselError::DatabaseError(_, info)) => {
            SqlExecutionError::ExecutionFailed(info.message().to_string())
        }
        DatabaseError::QueryError(e) => SqlExecutionError::ExecutionFailed(e.to_string()),
        other => SqlExecutionError::ConnectionError(other.to_string()),
    }
}

fn parse_rows(rows: Vec<JsonRow>) -> Result<QueryRows, SqlExecutionError> {
    let rows = rows
        .into_iter()
        .map(|r| match serde_json::from_str::<Value>(&r.row) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(SqlExecutionError::InvalidResult(format!(
                "expected a JSON object per row, got {}",
                other
            ))),
            Err(e) => Err(SqlExecutionError::InvalidResult(e.to_string())),
        })
        .collect::<Result<Vec<Row>, _>>()?;

    Ok(QueryRows::from_rows(rows))
}

#[async_trait]
impl SqlExecutor for PostgresSqlExecutor {
    async fn execute_read_only(&self, sql: &GeneratedSql) -> Result<QueryRows, SqlExecutionError> {
        let statement = wrap_statement(sql);
        let timeout = format!("SET LOCAL statement_timeout = {}", self.statement_timeout_ms);

        let rows = with_connection(&self.pool, move |conn| {
            conn.build_transaction().read_only().run(|conn| {
                diesel::sql_query(timeout).execute(conn)?;
                diesel::sql_query(statement).load::<JsonRow>(conn)
            })
        })
        .await
        .map_err(execution_error)?;

        parse_rows(rows)
    }

    async fn ping(&self) -> Result<(), SqlExecutionError> {
        with_connection(&self.pool, |conn| diesel::sql_query("SELECT 1").execute(conn))
            .await
            .map(|_| ())
            .map_err(|e| SqlExecutionError::ConnectionError(e.to_string()))
    }
}
