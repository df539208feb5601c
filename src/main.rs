use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod application;
mod config;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use application::use_cases::setup_data::{DEFAULT_TICKERS, SetupDataRequest};
use config::AppConfig;
use infrastructure::container::AppContainer;
use presentation::http::HttpServer;

#[derive(Parser)]
#[command(name = "finquery", version, about = "Natural-language questions over a financial database")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Migrate, load seed and market data, then index the schema
    Setup {
        #[arg(long, default_value = "DEMO_DATASET.json")]
        seed: PathBuf,
        /// Tickers to pull from Yahoo Finance
        #[arg(long, value_delimiter = ',')]
        tickers: Vec<String>,
        #[arg(long, default_value_t = 2)]
        years: u32,
        #[arg(long, default_value_t = 5000)]
        metrics: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finquery=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }

            let container = AppContainer::new(&config).await?;
            let server = HttpServer::new(
                container.query_handler.clone(),
                container.stats_handler.clone(),
                container.health_handler.clone(),
                config.server.host,
                config.server.port,
            );
            server.run().await?;
        }
        Command::Setup {
            seed,
            tickers,
            years,
            metrics,
        } => {
            info!("[1/5] Connecting to database and running migrations");
            let container = AppContainer::new(&config).await?;

            let tickers = if tickers.is_empty() {
                DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect()
            } else {
                tickers
            };

            let report = container
                .setup_data_use_case
                .execute(SetupDataRequest {
                    seed_path: Some(seed),
                    tickers,
                    years,
                    metrics,
                })
                .await?;

            let counts = &report.table_counts;
            println!("Setup complete");
            match &report.seed {
                Some(seed) => println!(
                    "  seed file:             {} companies, {} portfolio, {} statements, {} metrics ({} rows skipped)",
                    seed.companies,
                    seed.portfolio_companies,
                    seed.financial_statements,
                    seed.performance_metrics,
                    seed.skipped_rows
                ),
                None => println!("  seed file:             not loaded"),
            }
            println!("  tickers synthesized:   {}", report.tickers_synthesized);
            println!("  metrics generated:     {}", report.metrics_generated);
            println!("  schema elements:       {}", report.schema_elements_indexed);
            println!("Table counts");
            println!("  companies:             {}", counts.companies);
            println!("  financial_statements:  {}", counts.financial_statements);
            println!("  portfolio_companies:   {}", counts.portfolio_companies);
            println!("  performance_metrics:   {}", counts.performance_metrics);
            println!("  market_data:           {}", counts.market_data);
            println!(
                "  schema index:          {} documents (dimension {})",
                report.vector_store.total_documents, report.vector_store.dimension
            );
        }
    }

    Ok(())
}
