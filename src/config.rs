use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::clients::serpapi::SERPAPI_SEARCH_URL;

const SERPAPI_KEY_ENV: &str = "SERPAPI_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub scraping: ScrapingConfig,

    pub cache: CacheConfig,

    pub providers: ProvidersConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/jobhub.db".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Pause taken by each provider after its upstream request.
    pub delay_seconds: f64,

    pub max_results_per_platform: usize,

    pub request_timeout_seconds: u64,

    /// Upper bound for one whole aggregation; 0 disables it.
    pub search_timeout_seconds: u64,

    /// Drop repeated (title, company, application url) across providers.
    pub dedup_enabled: bool,

    pub user_agent: String,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 1.0,
            max_results_per_platform: 50,
            request_timeout_seconds: 30,
            search_timeout_seconds: 60,
            dedup_enabled: true,
            user_agent: "JobHub-Aggregator/1.0 (Job Search Application)".to_string(),
        }
    }
}

impl ScrapingConfig {
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_seconds).unwrap_or_default()
    }

    #[must_use]
    pub fn search_timeout(&self) -> Option<Duration> {
        (self.search_timeout_seconds > 0).then(|| Duration::from_secs(self.search_timeout_seconds))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Database,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    pub expiry_minutes: u64,

    pub backend: CacheBackend,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            expiry_minutes: 30,
            backend: CacheBackend::Database,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.expiry_minutes.saturating_mul(60))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub name: String,

    /// Apply links must contain this domain for a listing to be kept.
    pub domain: String,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl PlatformConfig {
    #[must_use]
    pub fn new(name: &str, domain: &str, enabled: bool) -> Self {
        Self {
            name: name.to_string(),
            domain: domain.to_string(),
            enabled,
        }
    }
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub serpapi_key: String,

    pub serpapi_url: String,

    pub platforms: Vec<PlatformConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            serpapi_key: String::new(),
            serpapi_url: SERPAPI_SEARCH_URL.to_string(),
            platforms: vec![
                PlatformConfig::new("Indeed", "indeed.com", true),
                PlatformConfig::new("LinkedIn", "linkedin.com", true),
                PlatformConfig::new("Naukri", "naukri.com", true),
                PlatformConfig::new("Glassdoor", "glassdoor.com", false),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(SERPAPI_KEY_ENV)
            && !key.trim().is_empty()
        {
            self.providers.serpapi_key = key;
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("jobhub").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".jobhub").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.scraping.max_results_per_platform == 0 {
            anyhow::bail!("scraping.max_results_per_platform must be > 0");
        }

        if !self.scraping.delay_seconds.is_finite() || self.scraping.delay_seconds < 0.0 {
            anyhow::bail!("scraping.delay_seconds must be a non-negative number");
        }

        if self.cache.expiry_minutes.checked_mul(60).is_none() {
            anyhow::bail!(
                "cache.expiry_minutes is too large: {}",
                self.cache.expiry_minutes
            );
        }

        let mut seen = std::collections::HashSet::new();
        for platform in &self.providers.platforms {
            if platform.enabled
                && (platform.name.trim().is_empty() || platform.domain.trim().is_empty())
            {
                anyhow::bail!("Enabled platforms need both a name and a domain");
            }

            if !seen.insert(platform.name.to_lowercase()) {
                anyhow::bail!("Duplicate platform name '{}'", platform.name);
            }
        }

        Ok(())
    }

    pub fn enabled_platforms(&self) -> impl Iterator<Item = &PlatformConfig> {
        self.providers.platforms.iter().filter(|p| p.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!((config.scraping.delay_seconds - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.scraping.max_results_per_platform, 50);
        assert_eq!(config.cache.expiry_minutes, 30);
        assert_eq!(config.cache.ttl(), Duration::from_secs(1800));
        assert_eq!(config.enabled_platforms().count(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[scraping]"));
        assert!(toml_str.contains("[cache]"));
        assert!(toml_str.contains("[[providers.platforms]]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [scraping]
            delay_seconds = 0.25
            max_results_per_platform = 10

            [cache]
            expiry_minutes = 5
            backend = "memory"

            [[providers.platforms]]
            name = "Indeed"
            domain = "indeed.com"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.scraping.delay(), Duration::from_millis(250));
        assert_eq!(config.scraping.max_results_per_platform, 10);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.providers.platforms.len(), 1);
        assert!(config.providers.platforms[0].enabled);

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.scraping.search_timeout_seconds, 60);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.scraping.max_results_per_platform = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scraping.delay_seconds = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config
            .providers
            .platforms
            .push(PlatformConfig::new("indeed", "indeed.co.uk", true));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.providers.platforms = vec![PlatformConfig::new("Empty", "", true)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_cache_expiry() {
        let mut config = Config::default();
        config.cache.expiry_minutes = 400_000_000_000_000_000;

        assert_eq!(config.cache.ttl(), Duration::from_secs(u64::MAX));
        assert!(config.validate().is_err());

        config.cache.expiry_minutes = 60 * 24 * 365;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_search_timeout_zero_disables() {
        let mut scraping = ScrapingConfig::default();
        assert_eq!(scraping.search_timeout(), Some(Duration::from_secs(60)));
        scraping.search_timeout_seconds = 0;
        assert_eq!(scraping.search_timeout(), None);
    }
}
