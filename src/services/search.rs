use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{AggregateError, Aggregator};
use crate::cache::{CacheError, SearchHistoryRecord, SearchStore};
use crate::models::{Job, SearchQuery, ValidationError};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Aggregate(AggregateError),
}

impl From<AggregateError> for SearchError {
    fn from(err: AggregateError) -> Self {
        match err {
            AggregateError::Validation(e) => Self::Validation(e),
            other => Self::Aggregate(other),
        }
    }
}

/// Cache-fronted entry point for job searches.
pub struct SearchService {
    aggregator: Arc<Aggregator>,
    store: Arc<dyn SearchStore>,
    cache_enabled: bool,
    ttl: Duration,
}

impl SearchService {
    #[must_use]
    pub fn new(aggregator: Arc<Aggregator>, store: Arc<dyn SearchStore>, ttl: Duration) -> Self {
        Self {
            aggregator,
            store,
            cache_enabled: true,
            ttl,
        }
    }

    #[must_use]
    pub const fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Job>, SearchError> {
        query.validate()?;
        let started = Instant::now();
        let key = query.cache_key();

        if self.cache_enabled {
            match self.store.cache_get(&key).await {
                Ok(Some(entry)) => {
                    metrics::counter!("search_cache_total", "outcome" => "hit").increment(1);
                    debug!(key = %key, hits = entry.hit_count, "Serving search from cache");
                    self.log_search(query, entry.results.len()).await;
                    metrics::histogram!("search_duration_seconds", "cache" => "hit")
                        .record(started.elapsed().as_secs_f64());
                    return Ok(entry.results);
                }
                Ok(None) => {
                    metrics::counter!("search_cache_total", "outcome" => "miss").increment(1);
                }
                Err(e) => {
                    metrics::counter!("search_cache_total", "outcome" => "error").increment(1);
                    warn!(error = %e, "Cache read failed, searching providers");
                }
            }
        }

        let aggregation = self.aggregator.aggregate(query).await?;
        let all_failed = aggregation.all_failed();
        let mut jobs = aggregation.jobs;
        assign_ids(&mut jobs);

        if all_failed {
            warn!(
                key = %key,
                providers = aggregation.attempted,
                "Every provider failed, not caching empty results"
            );
        } else if self.cache_enabled
            && let Err(e) = self.store.cache_put(&key, query, &jobs, self.ttl).await
        {
            warn!(error = %e, "Failed to cache search results");
        }

        self.log_search(query, jobs.len()).await;

        metrics::histogram!("search_duration_seconds", "cache" => "miss")
            .record(started.elapsed().as_secs_f64());
        info!(
            title = query.title(),
            platform = query.platform(),
            count = jobs.len(),
            "Search completed"
        );

        Ok(jobs)
    }

    pub async fn recent_searches(&self, limit: u64) -> Result<Vec<SearchHistoryRecord>, CacheError> {
        self.store.recent_searches(limit).await
    }

    async fn log_search(&self, query: &SearchQuery, count: usize) {
        let record = SearchHistoryRecord::new(query, count);
        if let Err(e) = self.store.log_search(&record).await {
            warn!(error = %e, "Failed to record search history");
        }
    }
}

/// Result ids are 1-based positions in the merged list.
fn assign_ids(jobs: &mut [Job]) {
    for (index, job) in jobs.iter_mut().enumerate() {
        job.id = (index + 1).to_string();
    }
}
