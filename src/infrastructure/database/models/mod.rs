pub mod company_model;
pub mod financial_models;
pub mod query_log_model;
pub mod schema_embedding_model;

pub use company_model::*;
pub use financial_models::*;
pub use query_log_model::*;
pub use schema_embedding_model::*;
