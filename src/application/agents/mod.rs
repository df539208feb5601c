pub mod analysis_agent;
pub mod enrichment_agent;
pub mod orchestrator;
pub mod reasoning;
pub mod retrieval_agent;

pub use analysis_agent::AnalysisAgent;
pub use enrichment_agent::EnrichmentAgent;
pub use orchestrator::{AgentOrchestrator, QueryOutcome};
pub use retrieval_agent::RetrievalAgent;
