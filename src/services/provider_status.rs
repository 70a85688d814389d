use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub requests: u64,
    pub errors: u64,
    pub jobs_returned: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// In-memory per-provider request counters, keyed by provider name.
#[derive(Default)]
pub struct ProviderStatusTracker {
    statuses: RwLock<HashMap<String, ProviderStatus>>,
}

impl ProviderStatusTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_success(&self, provider: &str, jobs: usize) {
        let mut statuses = self.statuses.write().await;
        let status = statuses.entry(provider.to_string()).or_default();
        status.requests += 1;
        status.jobs_returned += u64::try_from(jobs).unwrap_or(u64::MAX);
        status.last_success = Some(Utc::now());
    }

    pub async fn record_failure(&self, provider: &str, error: &str) {
        let mut statuses = self.statuses.write().await;
        let status = statuses.entry(provider.to_string()).or_default();
        status.requests += 1;
        status.errors += 1;
        status.last_failure = Some(Utc::now());
        status.last_error = Some(error.to_string());
    }

    pub async fn get(&self, provider: &str) -> ProviderStatus {
        self.statuses
            .read()
            .await
            .get(provider)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn snapshot(&self) -> HashMap<String, ProviderStatus> {
        self.statuses.read().await.clone()
    }
}
