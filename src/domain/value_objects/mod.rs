pub mod generated_sql;
pub mod stage_status;

pub use generated_sql::{GeneratedSql, SqlValidationError};
pub use stage_status::{AgentFlow, StageStatus};
