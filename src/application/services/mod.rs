pub mod data_loader;
pub mod schema_indexer;
pub mod seed_workbook;
pub mod sql_generator;

pub use data_loader::DataLoader;
pub use schema_indexer::SchemaIndexer;
pub use sql_generator::SqlGenerator;
