use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::cache::{CacheEntry, CacheError, SearchHistoryRecord, SearchStore};
use crate::models::{CacheKey, Job, SearchQuery};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn cache_repo(&self) -> repositories::cache::JobCacheRepository {
        repositories::cache::JobCacheRepository::new(self.conn.clone())
    }

    fn history_repo(&self) -> repositories::history::SearchHistoryRepository {
        repositories::history::SearchHistoryRepository::new(self.conn.clone())
    }

    pub async fn purge_expired_cache(&self) -> Result<u64, CacheError> {
        self.cache_repo().purge_expired().await
    }
}

#[async_trait]
impl SearchStore for Store {
    async fn cache_get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        self.cache_repo().get(key).await
    }

    async fn cache_put(
        &self,
        key: &CacheKey,
        query: &SearchQuery,
        results: &[Job],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.cache_repo().put(key, query, results, ttl).await
    }

    async fn log_search(&self, record: &SearchHistoryRecord) -> Result<(), CacheError> {
        self.history_repo().add(record).await.map(|_| ())
    }

    async fn recent_searches(&self, limit: u64) -> Result<Vec<SearchHistoryRecord>, CacheError> {
        self.history_repo().recent(limit).await
    }
}
