use std::sync::Arc;

use crate::application::agents::{AgentOrchestrator, QueryOutcome};

#[derive(Debug, thiserror::Error)]
pub enum ProcessQueryError {
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct ProcessQueryRequest {
    pub query: String,
}

pub struct ProcessQueryUseCase {
    orchestrator: Arc<AgentOrchestrator>,
}

impl ProcessQueryUseCase {
    pub fn new(orchestrator: Arc<AgentOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn execute(
        &self,
        request: ProcessQueryRequest,
    ) -> Result<QueryOutcome, ProcessQueryError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(ProcessQueryError::ValidationError(
                "Query cannot be empty".to_string(),
            ));
        }

        Ok(self.orchestrator.process_query(query).await)
    }
}
