use std::sync::Arc;
use tracing::info;

use crate::{
    application::{
        agents::{AgentOrchestrator, AnalysisAgent, EnrichmentAgent, RetrievalAgent},
        ports::{
            EmbeddingProvider, FilingsProvider, LanguageModel, MarketDataProvider, SchemaCatalog,
            SqlExecutor, VectorIndex,
        },
        services::{DataLoader, SchemaIndexer, SqlGenerator},
        use_cases::{
            CheckHealthUseCase, GetPlatformStatsUseCase, GetQueryHistoryUseCase,
            IndexSchemaUseCase, ProcessQueryUseCase, SetupDataUseCase,
        },
    },
    config::{AppConfig, VectorBackend},
    domain::repositories::{FinancialDataRepository, QueryLogRepository},
    infrastructure::{
        database::{
            DbPool, create_connection_pool,
            repositories::{
                PostgresFinancialDataRepository, PostgresQueryLogRepository,
                PostgresSchemaCatalog, PostgresSqlExecutor,
            },
            run_migrations,
        },
        external_services::{
            OpenAiClient, OpenAiClientConfig, OpenAiEmbeddingProvider, OpenAiLanguageModel,
            SecEdgarClient, YahooFinanceClient,
        },
        vector_store::{MemoryVectorIndex, PgVectorIndex},
    },
    presentation::http::handlers::{HealthHandler, QueryHandler, StatsHandler},
};

const ENRICHMENT_TIMEOUT_SECS: u64 = 10;

pub struct AppContainer {
    pub db_pool: DbPool,

    // Repositories
    pub query_log_repository: Arc<dyn QueryLogRepository>,
    pub financial_repository: Arc<dyn FinancialDataRepository>,

    // External Services
    pub embedding_provider: Arc<dyn EmbeddingProvider>,
    pub language_model: Arc<dyn LanguageModel>,
    pub market_data: Arc<dyn MarketDataProvider>,
    pub filings: Arc<dyn FilingsProvider>,
    pub vector_index: Arc<dyn VectorIndex>,
    pub sql_executor: Arc<dyn SqlExecutor>,

    // Application Services
    pub schema_indexer: Arc<SchemaIndexer>,
    pub data_loader: Arc<DataLoader>,
    pub orchestrator: Arc<AgentOrchestrator>,

    // Use Cases
    pub process_query_use_case: Arc<ProcessQueryUseCase>,
    pub get_query_history_use_case: Arc<GetQueryHistoryUseCase>,
    pub get_platform_stats_use_case: Arc<GetPlatformStatsUseCase>,
    pub index_schema_use_case: Arc<IndexSchemaUseCase>,
    pub check_health_use_case: Arc<CheckHealthUseCase>,
    pub setup_data_use_case: Arc<SetupDataUseCase>,

    // HTTP Handlers
    pub query_handler: Arc<QueryHandler>,
    pub stats_handler: Arc<StatsHandler>,
    pub health_handler: Arc<HealthHandler>,
}

impl AppContainer {
    pub async fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db_pool = create_connection_pool(&config.database)
            .map_err(|e| format!("Failed to create database connection pool: {}", e))?;
        run_migrations(&db_pool).map_err(|e| format!("Failed to run database migrations: {}", e))?;

        // Repositories
        let query_log_repository: Arc<dyn QueryLogRepository> =
            Arc::new(PostgresQueryLogRepository::new(db_pool.clone()));
        let financial_repository: Arc<dyn FinancialDataRepository> =
            Arc::new(PostgresFinancialDataRepository::new(db_pool.clone()));
        let schema_catalog: Arc<dyn SchemaCatalog> =
            Arc::new(PostgresSchemaCatalog::new(db_pool.clone()));
        let sql_executor: Arc<dyn SqlExecutor> = Arc::new(PostgresSqlExecutor::new(
            db_pool.clone(),
            config.database.statement_timeout_ms,
        ));

        // LLM
        let api_key = config.require_api_key()?;
        let openai = OpenAiClient::new(OpenAiClientConfig::from_llm_config(&config.llm, api_key))?;
        let embedding_provider: Arc<dyn EmbeddingProvider> =
            Arc::new(OpenAiEmbeddingProvider::new(openai.clone()));
        let language_model: Arc<dyn LanguageModel> = Arc::new(OpenAiLanguageModel::new(openai));

        let vector_index: Arc<dyn VectorIndex> = match config.vector_store.backend {
            VectorBackend::Postgres => Arc::new(PgVectorIndex::new(
                db_pool.clone(),
                embedding_provider.clone(),
            )),
            VectorBackend::Memory => Arc::new(
                MemoryVectorIndex::open(
                    embedding_provider.clone(),
                    config.vector_store.index_path.clone(),
                )
                .await?,
            ),
        };
        info!("Schema index backend: {:?}", config.vector_store.backend);

        // Enrichment sources
        let market_data: Arc<dyn MarketDataProvider> = Arc::new(YahooFinanceClient::new(
            &config.enrichment.yahoo_base_url,
            ENRICHMENT_TIMEOUT_SECS,
        )?);
        let sec_client = SecEdgarClient::new(
            &config.enrichment.sec_base_url,
            config.enrichment.sec_api_key.clone(),
            ENRICHMENT_TIMEOUT_SECS,
        )?;
        if !sec_client.is_configured() {
            info!("SEC_EDGAR_API_KEY not set, filings enrichment disabled");
        }
        let filings: Arc<dyn FilingsProvider> = Arc::new(sec_client);

        // Application services
        let schema_indexer = Arc::new(SchemaIndexer::new(schema_catalog, vector_index.clone()));
        let sql_generator = Arc::new(SqlGenerator::new(language_model.clone()));
        let data_loader = Arc::new(DataLoader::new(
            financial_repository.clone(),
            market_data.clone(),
        ));

        // Agents
        let retrieval_agent = Arc::new(RetrievalAgent::new(
            schema_indexer.clone(),
            sql_generator,
            sql_executor.clone(),
            config.vector_store.table_k,
            config.vector_store.column_k,
        ));
        let analysis_agent = Arc::new(AnalysisAgent::new(language_model.clone()));
        let enrichment_agent = Arc::new(EnrichmentAgent::new(market_data.clone(), filings.clone()));
        let orchestrator = Arc::new(AgentOrchestrator::new(
            retrieval_agent,
            analysis_agent,
            enrichment_agent,
            query_log_repository.clone(),
        ));

        // Use cases
        let process_query_use_case = Arc::new(ProcessQueryUseCase::new(orchestrator.clone()));
        let get_query_history_use_case =
            Arc::new(GetQueryHistoryUseCase::new(query_log_repository.clone()));
        let get_platform_stats_use_case = Arc::new(GetPlatformStatsUseCase::new(
            query_log_repository.clone(),
            financial_repository.clone(),
            vector_index.clone(),
        ));
        let index_schema_use_case = Arc::new(IndexSchemaUseCase::new(schema_indexer.clone()));
        let check_health_use_case = Arc::new(CheckHealthUseCase::new(
            sql_executor.clone(),
            vector_index.clone(),
        ));
        let setup_data_use_case = Arc::new(SetupDataUseCase::new(
            data_loader.clone(),
            schema_indexer.clone(),
            financial_repository.clone(),
        ));

        // HTTP handlers
        let query_handler = Arc::new(QueryHandler::new(
            process_query_use_case.clone(),
            get_query_history_use_case.clone(),
        ));
        let stats_handler = Arc::new(StatsHandler::new(
            get_platform_stats_use_case.clone(),
            index_schema_use_case.clone(),
        ));
        let health_handler = Arc::new(HealthHandler::new(check_health_use_case.clone()));

        Ok(Self {
            db_pool,
            query_log_repository,
            financial_repository,
            embedding_provider,
            language_model,
            market_data,
            filings,
            vector_index,
            sql_executor,
            schema_indexer,
            data_loader,
            orchestrator,
            process_query_use_case,
            get_query_history_use_case,
            get_platform_stats_use_case,
            index_schema_use_case,
            check_health_use_case,
            setup_data_use_case,
            query_handler,
            stats_handler,
            health_handler,
        })
    }
}
