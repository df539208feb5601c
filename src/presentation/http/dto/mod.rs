pub mod history_dto;
pub mod query_dto;
pub mod response_dto;
pub mod stats_dto;

pub use history_dto::*;
pub use query_dto::*;
pub use response_dto::*;
pub use stats_dto::*;
