use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One explainability entry recorded by an agent while it works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub agent: String,
    pub step: String,
    pub details: Value,
    pub timestamp: String,
}

impl ReasoningStep {
    pub fn new(agent: &str, step: &str, details: Value) -> Self {
        Self {
            agent: agent.to_string(),
            step: step.to_string(),
            details,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}
