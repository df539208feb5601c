use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit record written once per processed question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLog {
    id: Option<i32>,
    user_query: String,
    generated_sql: Option<String>,
    sql_result: Option<String>,
    final_answer: Option<String>,
    context_used: Option<String>,
    agent_reasoning: Option<String>,
    execution_time_ms: f64,
    success: bool,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl QueryLog {
    pub fn succeeded(
        user_query: String,
        generated_sql: Option<String>,
        sql_result: Option<String>,
        final_answer: Option<String>,
        context_used: Option<String>,
        agent_reasoning: Option<String>,
        execution_time_ms: f64,
    ) -> Self {
        Self {
            id: None,
            user_query,
            generated_sql,
            sql_result,
            final_answer,
            context_used,
            agent_reasoning,
            execution_time_ms,
            success: true,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    pub fn failed(
        user_query: String,
        generated_sql: Option<String>,
        error_message: String,
        agent_reasoning: Option<String>,
        execution_time_ms: f64,
    ) -> Self {
        Self {
            id: None,
            user_query,
            generated_sql,
            sql_result: None,
            final_answer: None,
            context_used: None,
            agent_reasoning,
            execution_time_ms,
            success: false,
            error_message: Some(error_message),
            created_at: Utc::now(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_database(
        id: i32,
        user_query: String,
        generated_sql: Option<String>,
        sql_result: Option<String>,
        final_answer: Option<String>,
        context_used: Option<String>,
        agent_reasoning: Option<String>,
        execution_time_ms: f64,
        success: bool,
        error_message: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            user_query,
            generated_sql,
            sql_result,
            final_answer,
            context_used,
            agent_reasoning,
            execution_time_ms,
            success,
            error_message,
            created_at,
        }
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    pub fn generated_sql(&self) -> Option<&str> {
        self.generated_sql.as_deref()
    }

    pub fn sql_result(&self) -> Option<&str> {
        self.sql_result.as_deref()
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.final_answer.as_deref()
    }

    pub fn context_used(&self) -> Option<&str> {
        self.context_used.as_deref()
    }

    pub fn agent_reasoning(&self) -> Option<&str> {
        self.agent_reasoning.as_deref()
    }

    pub fn execution_time_ms(&self) -> f64 {
        self.execution_time_ms
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
