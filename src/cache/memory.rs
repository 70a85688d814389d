use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::RwLock;

use super::{CacheEntry, CacheError, SearchHistoryRecord, SearchStore};
use crate::models::{CacheKey, Job, SearchQuery};

const MAX_HISTORY: usize = 1000;

/// Process-local store. Entries are swapped whole under the write lock, so a
/// reader never sees a partially written entry.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    history: RwLock<VecDeque<SearchHistoryRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every expired entry and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh_at(now));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SearchStore for MemoryStore {
    async fn cache_get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        let Some(entry) = entries.get_mut(key) else {
            return Ok(None);
        };

        if !entry.is_fresh_at(now) {
            entries.remove(key);
            return Ok(None);
        }

        entry.hit_count += 1;
        Ok(Some(entry.clone()))
    }

    async fn cache_put(
        &self,
        key: &CacheKey,
        _query: &SearchQuery,
        results: &[Job],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry::new(results.to_vec(), Utc::now(), ttl);
        self.entries.write().await.insert(key.clone(), entry);
        Ok(())
    }

    async fn log_search(&self, record: &SearchHistoryRecord) -> Result<(), CacheError> {
        let mut history = self.history.write().await;
        if history.len() >= MAX_HISTORY {
            history.pop_front();
        }
        history.push_back(record.clone());
        Ok(())
    }

    async fn recent_searches(&self, limit: u64) -> Result<Vec<SearchHistoryRecord>, CacheError> {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let history = self.history.read().await;
        Ok(history.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawJob;
    use crate::parser::normalize;

    fn jobs() -> Vec<Job> {
        vec![normalize(
            "Indeed",
            RawJob {
                title: Some("Rust Engineer".to_string()),
                company: Some("Acme".to_string()),
                ..Default::default()
            },
        )]
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let store = MemoryStore::new();
        let query = SearchQuery::new("Rust");
        let key = query.cache_key();

        store
            .cache_put(&key, &query, &jobs(), Duration::ZERO)
            .await
            .unwrap();

        assert!(store.cache_get(&key).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_hit_count_increments_per_get() {
        let store = MemoryStore::new();
        let query = SearchQuery::new("Rust");
        let key = query.cache_key();
        let results = jobs();

        store
            .cache_put(&key, &query, &results, Duration::from_secs(30 * 60))
            .await
            .unwrap();

        for expected in 1..=3 {
            let entry = store.cache_get(&key).await.unwrap().unwrap();
            assert_eq!(entry.results, results);
            assert_eq!(entry.hit_count, expected);
        }
    }

    #[tokio::test]
    async fn test_put_resets_hit_count() {
        let store = MemoryStore::new();
        let query = SearchQuery::new("Rust");
        let key = query.cache_key();
        let ttl = Duration::from_secs(60);

        store.cache_put(&key, &query, &jobs(), ttl).await.unwrap();
        store.cache_get(&key).await.unwrap();
        store.cache_get(&key).await.unwrap();

        store.cache_put(&key, &query, &[], ttl).await.unwrap();
        let entry = store.cache_get(&key).await.unwrap().unwrap();
        assert_eq!(entry.hit_count, 1);
        assert!(entry.results.is_empty());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryStore::new();
        let fresh = SearchQuery::new("fresh");
        let stale = SearchQuery::new("stale");

        store
            .cache_put(&fresh.cache_key(), &fresh, &[], Duration::from_secs(60))
            .await
            .unwrap();
        store
            .cache_put(&stale.cache_key(), &stale, &[], Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_recent_searches_newest_first() {
        let store = MemoryStore::new();
        for (i, title) in ["first", "second", "third"].into_iter().enumerate() {
            store
                .log_search(&SearchHistoryRecord::new(&SearchQuery::new(title), i))
                .await
                .unwrap();
        }

        let recent = store.recent_searches(2).await.unwrap();
        let titles: Vec<&str> = recent.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second"]);
    }
}
