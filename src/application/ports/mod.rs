pub mod embedding_provider;
pub mod filings_provider;
pub mod language_model;
pub mod market_data_provider;
pub mod schema_catalog;
pub mod sql_executor;
pub mod vector_index;

pub use embedding_provider::EmbeddingProvider;
pub use filings_provider::FilingsProvider;
pub use language_model::LanguageModel;
pub use market_data_provider::MarketDataProvider;
pub use schema_catalog::SchemaCatalog;
pub use sql_executor::SqlExecutor;
pub use vector_index::VectorIndex;
