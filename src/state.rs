use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{MemoryStore, SearchStore};
use crate::config::{CacheBackend, Config, ScrapingConfig};
use crate::db::Store;
use crate::providers::ProviderRegistry;
use crate::services::{Aggregator, ProviderStatusTracker, SearchService};

/// One HTTP client for every provider so connections are pooled.
pub fn build_shared_http_client(scraping: &ScrapingConfig) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(scraping.request_timeout_seconds))
        .user_agent(scraping.user_agent.clone())
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    /// Present when the database backend is in use.
    pub database: Option<Store>,

    pub store: Arc<dyn SearchStore>,

    pub registry: ProviderRegistry,

    pub provider_status: Arc<ProviderStatusTracker>,

    pub search_service: Arc<SearchService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(&config.scraping)?;
        let registry = ProviderRegistry::from_config(&config, http_client);
        Self::with_registry(config, registry).await
    }

    /// Builds the state around an explicit set of providers.
    pub async fn with_registry(config: Config, registry: ProviderRegistry) -> anyhow::Result<Self> {
        let (database, store): (Option<Store>, Arc<dyn SearchStore>) = match config.cache.backend {
            CacheBackend::Database => {
                let db = Store::with_pool_options(
                    &config.general.database_path,
                    config.general.max_db_connections,
                    config.general.min_db_connections,
                )
                .await?;
                (Some(db.clone()), Arc::new(db) as Arc<dyn SearchStore>)
            }
            CacheBackend::Memory => (None, Arc::new(MemoryStore::new()) as Arc<dyn SearchStore>),
        };

        let provider_status = Arc::new(ProviderStatusTracker::new());
        let aggregator = Arc::new(Aggregator::from_config(
            &config.scraping,
            registry.clone(),
            provider_status.clone(),
        ));

        let search_service = Arc::new(
            SearchService::new(aggregator, store.clone(), config.cache.ttl())
                .with_cache_enabled(config.cache.enabled),
        );

        info!(
            providers = ?registry.names(),
            backend = ?config.cache.backend,
            "Search stack ready"
        );

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            database,
            store,
            registry,
            provider_status,
            search_service,
        })
    }
}
