//! Result cache and search history persistence.
//!
//! The search service only talks to [`SearchStore`]. Two backends exist:
//! [`MemoryStore`] for single-process use and tests, and the SeaORM-backed
//! [`crate::db::Store`].

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::{CacheKey, Job, SearchQuery};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub results: Vec<Job>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub hit_count: u64,
}

impl CacheEntry {
    #[must_use]
    pub fn new(results: Vec<Job>, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = created_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            results,
            created_at,
            expires_at,
            hit_count: 0,
        }
    }

    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryRecord {
    pub title: String,
    pub location: Option<String>,
    pub platform: String,
    pub results_count: usize,
    pub searched_at: DateTime<Utc>,
}

impl SearchHistoryRecord {
    #[must_use]
    pub fn new(query: &SearchQuery, results_count: usize) -> Self {
        Self {
            title: query.title().to_string(),
            location: query.location.as_deref().map(str::trim).map(str::to_string),
            platform: query.platform().to_string(),
            results_count,
            searched_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Returns the entry only while it is fresh, bumping its hit count.
    async fn cache_get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    /// Replaces any entry for `key`; timestamps and hit count start over.
    async fn cache_put(
        &self,
        key: &CacheKey,
        query: &SearchQuery,
        results: &[Job],
        ttl: Duration,
    ) -> Result<(), CacheError>;

    async fn log_search(&self, record: &SearchHistoryRecord) -> Result<(), CacheError>;

    /// Most recent searches first.
    async fn recent_searches(&self, limit: u64) -> Result<Vec<SearchHistoryRecord>, CacheError>;
}
