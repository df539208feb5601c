pub mod openai_client;
pub mod sec_edgar_client;
pub mod yahoo_finance_client;

pub use openai_client::{OpenAiClient, OpenAiClientConfig, OpenAiEmbeddingProvider, OpenAiLanguageModel};
pub use sec_edgar_client::SecEdgarClient;
pub use yahoo_finance_client::YahooFinanceClient;
