//! Upstream job providers.
//!
//! Every job board the aggregator can query implements [`JobProvider`].
//! Providers are collected in a [`ProviderRegistry`] in registration order,
//! which is also the order their results are merged in.

pub mod serpapi;

pub use serpapi::SerpApiProvider;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::clients::SerpApiClient;
use crate::config::Config;
use crate::models::Job;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed upstream payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("No API key configured")]
    MissingApiKey,
}

impl ProviderError {
    /// Short label used for metrics and status tracking.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Status { .. } => "status",
            Self::Parse(_) => "parse",
            Self::Upstream(_) => "upstream",
            Self::MissingApiKey => "missing_api_key",
        }
    }
}

#[async_trait]
pub trait JobProvider: Send + Sync {
    /// Platform identifier stamped on every job this provider returns.
    fn name(&self) -> &str;

    /// Fetches, filters and normalizes listings for one query.
    ///
    /// Implementations cap the result at the configured maximum.
    async fn fetch(&self, title: &str, location: &str) -> Result<Vec<Job>, ProviderError>;
}

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn JobProvider>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one SerpApi-backed provider per enabled platform.
    #[must_use]
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let serpapi = Arc::new(SerpApiClient::with_shared_client(
            client,
            config.providers.serpapi_url.clone(),
            config.providers.serpapi_key.clone(),
        ));

        let mut registry = Self::new();
        for platform in config.enabled_platforms() {
            registry.register(Arc::new(SerpApiProvider::new(
                platform.clone(),
                serpapi.clone(),
                config.scraping.max_results_per_platform,
            )));
        }
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn JobProvider>) {
        self.providers.push(provider);
    }

    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn JobProvider>] {
        &self.providers
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Arc<dyn JobProvider>> {
        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
