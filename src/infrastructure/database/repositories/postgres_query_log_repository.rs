use async_trait::async_trait;
use diesel::prelude::*;

use crate::domain::entities::QueryLog;
use crate::domain::repositories::{QueryLogRepository, query_log_repository::QueryLogRepositoryError};
use crate::infrastructure::database::models::{NewQueryLogModel, QueryLogModel};
use crate::infrastructure::database::schema::query_logs;
use crate::infrastructure::database::{DbPool, with_connection};

pub struct PostgresQueryLogRepository {
    pool: DbPool,
}

impl PostgresQueryLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryLogRepository for PostgresQueryLogRepository {
    async fn save(&self, log: &QueryLog) -> Result<(), QueryLogRepositoryError> {
        let new_log = NewQueryLogModel::from(log);

        with_connection(&self.pool, move |conn| {
            diesel::insert_into(query_logs::table)
                .values(&new_log)
                .execute(conn)
        })
        .await
        .map_err(|e| QueryLogRepositoryError::DatabaseError(format!("Failed to save query log: {}", e)))?;

        Ok(())
    }

    async fn find_recent(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<QueryLog>, QueryLogRepositoryError> {
        let models = with_connection(&self.pool, move |conn| {
            query_logs::table
                .order((query_logs::created_at.desc(), query_logs::id.desc()))
                .limit(limit)
                .offset(offset)
                .select(QueryLogModel::as_select())
                .load(conn)
        })
        .await
        .map_err(|e| QueryLogRepositoryError::DatabaseError(format!("Failed to load history: {}", e)))?;

        Ok(models.into_iter().map(QueryLog::from).collect())
    }

    async fn count(&self) -> Result<i64, QueryLogRepositoryError> {
        with_connection(&self.pool, |conn| query_logs::table.count().get_result(conn))
            .await
            .map_err(|e| QueryLogRepositoryError::DatabaseError(e.to_string()))
    }

    async fn count_successful(&self) -> Result<i64, QueryLogRepositoryError> {
        with_connection(&self.pool, |conn| {
            query_logs::table
                .filter(query_logs::success.eq(true))
                .count()
                .get_result(conn)
        })
        .await
        .map_err(|e| QueryLogRepositoryError::DatabaseError(e.to_string()))
    }
}
