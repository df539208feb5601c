use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use crate::application::agents::retrieval_agent::RetrievalOutput;
use crate::domain::entities::ReasoningStep;

/// Explainability trail for one agent during one question.
#[derive(Debug, Clone)]
pub struct ReasoningLog {
    agent: &'static str,
    steps: Vec<ReasoningStep>,
}

impl ReasoningLog {
    pub fn new(agent: &'static str) -> Self {
        Self {
            agent,
            steps: Vec::new(),
        }
    }

    pub fn log(&mut self, step: &str, details: impl Serialize) {
        let details = serde_json::to_value(details).unwrap_or(Value::Null);
        self.steps.push(ReasoningStep::new(self.agent, step, details));
    }

    pub fn snapshot(&self) -> &[ReasoningStep] {
        &self.steps
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn into_steps(self) -> Vec<ReasoningStep> {
        self.steps
    }
}

/// What a stage gets to see: the question and whatever retrieval produced.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub query: &'a str,
    pub started_at: Instant,
    /// `None` until retrieval succeeded.
    pub retrieval: Option<&'a RetrievalOutput>,
}

impl<'a> QueryContext<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            started_at: Instant::now(),
            retrieval: None,
        }
    }

    pub fn with_retrieval(mut self, retrieval: &'a RetrievalOutput) -> Self {
        self.retrieval = Some(retrieval);
        self
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64() * 1000.0
    }
}

#[async_trait]
pub trait Agent: Send + Sync {
    type Output: Send;

    fn name(&self) -> &'static str;

    async fn execute(&self, context: &QueryContext<'_>) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_records_agent_and_order() {
        let mut log = ReasoningLog::new("RetrievalAgent");
        log.log("query_received", "top companies by revenue");
        log.log("schema_retrieval", json!({"relevant_tables": ["companies"]}));

        let steps = log.snapshot();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].agent, "RetrievalAgent");
        assert_eq!(steps[0].step, "query_received");
        assert_eq!(steps[0].details, json!("top companies by revenue"));
        assert_eq!(steps[1].details["relevant_tables"][0], "companies");
    }

    #[test]
    fn test_clear_empties_the_trail() {
        let mut log = ReasoningLog::new("AnalysisAgent");
        log.log("analysis_started", json!({}));
        log.clear();
        assert!(log.into_steps().is_empty());
    }
}
