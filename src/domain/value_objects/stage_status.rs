use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Completed,
    Skipped,
    Failed,
}

impl StageStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, StageStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Completed => "completed",
            StageStatus::Skipped => "skipped",
            StageStatus::Failed => "failed",
        }
    }
}

/// Outcome of each pipeline stage for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFlow {
    pub retrieval: StageStatus,
    pub analysis: StageStatus,
    pub enrichment: StageStatus,
}

impl AgentFlow {
    pub fn retrieval_failed() -> Self {
        Self {
            retrieval: StageStatus::Failed,
            analysis: StageStatus::Skipped,
            enrichment: StageStatus::Skipped,
        }
    }
}
