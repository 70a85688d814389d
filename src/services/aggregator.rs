use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::ProviderStatusTracker;
use crate::config::ScrapingConfig;
use crate::models::{Job, SearchQuery, ValidationError};
use crate::providers::{JobProvider, ProviderError, ProviderRegistry};

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("No job providers are registered")]
    NoProviders,

    #[error("Search timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// What one provider contributed to a search.
#[derive(Debug)]
pub struct ProviderOutcome {
    pub provider: String,
    pub result: Result<Vec<Job>, ProviderError>,
    pub elapsed: Duration,
}

impl ProviderOutcome {
    /// Jobs to merge; a failed provider contributes nothing.
    #[must_use]
    pub fn into_jobs(self) -> Vec<Job> {
        self.result.unwrap_or_default()
    }
}

/// Merged jobs plus how many of the selected providers answered.
#[derive(Debug)]
pub struct Aggregation {
    pub jobs: Vec<Job>,
    pub succeeded: usize,
    pub attempted: usize,
}

impl Aggregation {
    /// True when no selected provider answered, so an empty list means an
    /// outage rather than "no jobs".
    #[must_use]
    pub const fn all_failed(&self) -> bool {
        self.succeeded == 0
    }
}

pub struct Aggregator {
    registry: ProviderRegistry,
    status: Arc<ProviderStatusTracker>,
    delay: Duration,
    dedup: bool,
    timeout: Option<Duration>,
}

impl Aggregator {
    #[must_use]
    pub fn new(registry: ProviderRegistry, status: Arc<ProviderStatusTracker>) -> Self {
        Self {
            registry,
            status,
            delay: Duration::ZERO,
            dedup: true,
            timeout: None,
        }
    }

    #[must_use]
    pub fn from_config(
        config: &ScrapingConfig,
        registry: ProviderRegistry,
        status: Arc<ProviderStatusTracker>,
    ) -> Self {
        Self::new(registry, status)
            .with_delay(config.delay())
            .with_dedup(config.dedup_enabled)
            .with_timeout(config.search_timeout())
    }

    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub const fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Providers a query fans out to, in registration order.
    pub fn select(&self, query: &SearchQuery) -> Result<Vec<Arc<dyn JobProvider>>, AggregateError> {
        if self.registry.is_empty() {
            return Err(AggregateError::NoProviders);
        }

        if query.targets_all_platforms() {
            return Ok(self.registry.providers().to_vec());
        }

        self.registry
            .find(query.platform())
            .map(|provider| vec![provider.clone()])
            .ok_or_else(|| ValidationError::UnknownPlatform(query.platform().to_string()).into())
    }

    pub async fn aggregate(&self, query: &SearchQuery) -> Result<Aggregation, AggregateError> {
        let providers = self.select(query)?;
        let title = query.title();
        let location = query.location();

        info!(
            title,
            location,
            providers = providers.len(),
            "Fanning out job search"
        );

        let calls = providers
            .iter()
            .map(|provider| run_provider(provider.as_ref(), title, location, self.delay));

        let outcomes = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, join_all(calls))
                .await
                .map_err(|_| {
                    warn!(?limit, title, "Job search timed out, dropping in-flight providers");
                    AggregateError::Timeout(limit)
                })?,
            None => join_all(calls).await,
        };

        for outcome in &outcomes {
            self.record(outcome).await;
        }

        let attempted = outcomes.len();
        let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();

        Ok(Aggregation {
            jobs: merge(outcomes, self.dedup),
            succeeded,
            attempted,
        })
    }

    async fn record(&self, outcome: &ProviderOutcome) {
        metrics::histogram!("provider_duration_seconds", "provider" => outcome.provider.clone())
            .record(outcome.elapsed.as_secs_f64());

        match &outcome.result {
            Ok(jobs) => {
                metrics::counter!(
                    "provider_requests_total",
                    "provider" => outcome.provider.clone(),
                    "outcome" => "success"
                )
                .increment(1);
                metrics::counter!("provider_jobs_total", "provider" => outcome.provider.clone())
                    .increment(jobs.len() as u64);
                self.status.record_success(&outcome.provider, jobs.len()).await;
            }
            Err(e) => {
                metrics::counter!(
                    "provider_requests_total",
                    "provider" => outcome.provider.clone(),
                    "outcome" => e.kind()
                )
                .increment(1);
                self.status
                    .record_failure(&outcome.provider, &e.to_string())
                    .await;
            }
        }
    }
}

async fn run_provider(
    provider: &dyn JobProvider,
    title: &str,
    location: &str,
    delay: Duration,
) -> ProviderOutcome {
    let started = Instant::now();
    let result = provider.fetch(title, location).await;

    match &result {
        Ok(jobs) => debug!(provider = provider.name(), count = jobs.len(), "Provider finished"),
        Err(e) => warn!(provider = provider.name(), error = %e, "Provider failed, skipping"),
    }

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    ProviderOutcome {
        provider: provider.name().to_string(),
        result,
        elapsed: started.elapsed(),
    }
}

/// Concatenates outcomes in order, optionally keeping only the first job for
/// each dedup key.
#[must_use]
pub fn merge(outcomes: Vec<ProviderOutcome>, dedup: bool) -> Vec<Job> {
    let jobs = outcomes.into_iter().flat_map(ProviderOutcome::into_jobs);

    if !dedup {
        return jobs.collect();
    }

    let mut seen = HashSet::new();
    jobs.filter(|job| seen.insert(job.dedup_key())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawJob;
    use crate::parser::normalize;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        name: String,
        titles: Vec<&'static str>,
        fail: bool,
        latency: Duration,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn ok(name: &str, titles: Vec<&'static str>) -> Self {
            Self {
                name: name.to_string(),
                titles,
                fail: false,
                latency: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(name: &str) -> Self {
            Self {
                fail: true,
                ..Self::ok(name, vec![])
            }
        }

        fn slow(name: &str, latency: Duration) -> Self {
            Self {
                latency,
                ..Self::ok(name, vec!["Slow job"])
            }
        }
    }

    #[async_trait]
    impl JobProvider for StubProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch(&self, _title: &str, _location: &str) -> Result<Vec<Job>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            if self.fail {
                return Err(ProviderError::Upstream("boom".to_string()));
            }

            Ok(self
                .titles
                .iter()
                .map(|title| {
                    normalize(
                        &self.name,
                        RawJob {
                            title: Some((*title).to_string()),
                            company: Some("Acme".to_string()),
                            application_url: Some(format!("https://example.com/{title}")),
                            ..Default::default()
                        },
                    )
                })
                .collect())
        }
    }

    fn aggregator(providers: Vec<Arc<dyn JobProvider>>) -> Aggregator {
        let mut registry = ProviderRegistry::new();
        for provider in providers {
            registry.register(provider);
        }
        Aggregator::new(registry, Arc::new(ProviderStatusTracker::new()))
    }

    fn titles(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(|j| j.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_failing_provider_is_isolated() {
        let aggregator = aggregator(vec![
            Arc::new(StubProvider::ok("One", vec!["a1", "a2"])),
            Arc::new(StubProvider::failing("Two")),
            Arc::new(StubProvider::ok("Three", vec!["c1"])),
        ]);

        let aggregation = aggregator.aggregate(&SearchQuery::new("dev")).await.unwrap();
        assert_eq!(titles(&aggregation.jobs), vec!["a1", "a2", "c1"]);
        assert_eq!((aggregation.succeeded, aggregation.attempted), (2, 3));
        assert!(!aggregation.all_failed());

        let status = aggregator.status.get("Two").await;
        assert_eq!(status.errors, 1);
        assert_eq!(status.last_error.as_deref(), Some("Upstream error: boom"));
        assert_eq!(aggregator.status.get("One").await.jobs_returned, 2);
    }

    #[tokio::test]
    async fn test_all_providers_failing_yields_empty() {
        let aggregator = aggregator(vec![
            Arc::new(StubProvider::failing("One")),
            Arc::new(StubProvider::failing("Two")),
        ]);

        let aggregation = aggregator.aggregate(&SearchQuery::new("dev")).await.unwrap();
        assert!(aggregation.jobs.is_empty());
        assert_eq!(aggregation.attempted, 2);
        assert!(aggregation.all_failed());
    }

    #[tokio::test]
    async fn test_empty_answer_still_counts_as_success() {
        let aggregator = aggregator(vec![Arc::new(StubProvider::ok("One", vec![]))]);

        let aggregation = aggregator.aggregate(&SearchQuery::new("dev")).await.unwrap();
        assert!(aggregation.jobs.is_empty());
        assert_eq!(aggregation.succeeded, 1);
        assert!(!aggregation.all_failed());
    }

    #[tokio::test]
    async fn test_single_platform_selection() {
        let one = Arc::new(StubProvider::ok("Indeed", vec!["a"]));
        let two = Arc::new(StubProvider::ok("LinkedIn", vec!["b"]));
        let aggregator = aggregator(vec![one.clone(), two.clone()]);

        let jobs = aggregator
            .aggregate(&SearchQuery::new("dev").with_platform("linkedin"))
            .await
            .unwrap()
            .jobs;

        assert_eq!(titles(&jobs), vec!["b"]);
        assert_eq!(one.calls.load(Ordering::SeqCst), 0);
        assert_eq!(two.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_platform_is_validation_error() {
        let aggregator = aggregator(vec![Arc::new(StubProvider::ok("Indeed", vec![]))]);

        let err = aggregator
            .aggregate(&SearchQuery::new("dev").with_platform("Monster"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AggregateError::Validation(ValidationError::UnknownPlatform(ref p)) if p == "Monster"
        ));
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let err = aggregator(vec![])
            .aggregate(&SearchQuery::new("dev"))
            .await
            .unwrap_err();
        assert!(matches!(err, AggregateError::NoProviders));
    }

    #[tokio::test]
    async fn test_dedup_keeps_first_occurrence() {
        let providers: Vec<Arc<dyn JobProvider>> = vec![
            Arc::new(StubProvider::ok("One", vec!["Shared", "Only one"])),
            Arc::new(StubProvider::ok("Two", vec!["Shared", "Only two"])),
        ];

        let jobs = aggregator(providers.clone())
            .aggregate(&SearchQuery::new("dev"))
            .await
            .unwrap()
            .jobs;
        assert_eq!(titles(&jobs), vec!["Shared", "Only one", "Only two"]);
        assert_eq!(jobs[0].platform, "One");

        let jobs = aggregator(providers)
            .with_dedup(false)
            .aggregate(&SearchQuery::new("dev"))
            .await
            .unwrap()
            .jobs;
        assert_eq!(jobs.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_providers_run_concurrently() {
        let aggregator = aggregator(vec![
            Arc::new(StubProvider::slow("One", Duration::from_secs(5))),
            Arc::new(StubProvider::slow("Two", Duration::from_secs(5))),
            Arc::new(StubProvider::slow("Three", Duration::from_secs(5))),
        ])
        .with_delay(Duration::from_secs(1))
        .with_dedup(false);

        let started = tokio::time::Instant::now();
        let aggregation = aggregator.aggregate(&SearchQuery::new("dev")).await.unwrap();

        assert_eq!(aggregation.jobs.len(), 3);
        assert!(started.elapsed() < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_drops_slow_providers() {
        let aggregator = aggregator(vec![
            Arc::new(StubProvider::ok("Fast", vec!["a"])),
            Arc::new(StubProvider::slow("Slow", Duration::from_secs(120))),
        ])
        .with_timeout(Some(Duration::from_secs(10)));

        let err = aggregator
            .aggregate(&SearchQuery::new("dev"))
            .await
            .unwrap_err();

        assert!(matches!(err, AggregateError::Timeout(d) if d == Duration::from_secs(10)));
        assert_eq!(aggregator.status.get("Fast").await.requests, 0);
    }

    #[test]
    fn test_merge_skips_failed_outcomes() {
        let outcomes = vec![
            ProviderOutcome {
                provider: "One".to_string(),
                result: Err(ProviderError::MissingApiKey),
                elapsed: Duration::ZERO,
            },
            ProviderOutcome {
                provider: "Two".to_string(),
                result: Ok(vec![normalize("Two", RawJob::default())]),
                elapsed: Duration::ZERO,
            },
        ];

        let jobs = merge(outcomes, true);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].platform, "Two");
    }
}
