use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::entities::QueryLog;
use crate::infrastructure::database::schema::query_logs;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = query_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QueryLogModel {
    pub id: i32,
    pub user_query: String,
    pub generated_sql: Option<String>,
    pub sql_result: Option<String>,
    pub final_answer: Option<String>,
    pub context_used: Option<String>,
    pub agent_reasoning: Option<String>,
    pub execution_time_ms: f64,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = query_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewQueryLogModel {
    pub user_query: String,
    pub generated_sql: Option<String>,
    pub sql_result: Option<String>,
    pub final_answer: Option<String>,
    pub context_used: Option<String>,
    pub agent_reasoning: Option<String>,
    pub execution_time_ms: f64,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&QueryLog> for NewQueryLogModel {
    fn from(log: &QueryLog) -> Self {
        Self {
            user_query: log.user_query().to_string(),
            generated_sql: log.generated_sql().map(str::to_string),
            sql_result: log.sql_result().map(str::to_string),
            final_answer: log.final_answer().map(str::to_string),
            context_used: log.context_used().map(str::to_string),
            agent_reasoning: log.agent_reasoning().map(str::to_string),
            execution_time_ms: log.execution_time_ms(),
            success: log.is_success(),
            error_message: log.error_message().map(str::to_string),
            created_at: log.created_at(),
        }
    }
}

impl From<QueryLogModel> for QueryLog {
    fn from(model: QueryLogModel) -> Self {
        QueryLog::from_database(
            model.id,
            model.user_query,
            model.generated_sql,
            model.sql_result,
            model.final_answer,
            model.context_used,
            model.agent_reasoning,
            model.execution_time_ms,
            model.success,
            model.error_message,
            model.created_at,
        )
    }
}
