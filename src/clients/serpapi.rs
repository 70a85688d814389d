use crate::providers::ProviderError;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

pub const SERPAPI_SEARCH_URL: &str = "https://serpapi.com/search.json";

/// SerpApi reports an empty result set as an error string on a 200 response.
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

#[derive(Debug, Deserialize)]
struct GoogleJobsResponse {
    #[serde(default)]
    jobs_results: Vec<GoogleJob>,
    error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleJob {
    pub job_id: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub job_highlights: Vec<JobHighlight>,
    #[serde(default)]
    pub detected_extensions: DetectedExtensions,
    #[serde(default)]
    pub apply_options: Vec<ApplyOption>,
}

impl GoogleJob {
    /// Link of the first apply option, which identifies the hosting job board.
    #[must_use]
    pub fn primary_apply_link(&self) -> Option<&str> {
        self.apply_options.first().map(|o| o.link.as_str())
    }

    /// Items of the "Qualifications" highlight block, in listing order.
    #[must_use]
    pub fn qualifications(&self) -> Vec<String> {
        self.job_highlights
            .iter()
            .filter(|h| {
                h.title
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case("qualifications"))
            })
            .flat_map(|h| h.items.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobHighlight {
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectedExtensions {
    pub posted_at: Option<String>,
    pub schedule_type: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary: Option<String>,
    #[serde(default)]
    pub work_from_home: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplyOption {
    pub title: Option<String>,
    #[serde(default)]
    pub link: String,
}

/// Thin client for the SerpApi `google_jobs` engine.
#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SerpApiClient {
    /// Creates a client on top of a shared HTTP client so that every
    /// provider reuses one connection pool.
    #[must_use]
    pub fn with_shared_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn build_url(&self, title: &str, location: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Upstream(format!("Invalid SerpApi URL: {e}")))?;

        let q = if location.is_empty() {
            title.to_string()
        } else {
            format!("{title} jobs in {location}")
        };

        url.query_pairs_mut()
            .append_pair("engine", "google_jobs")
            .append_pair("q", &q)
            .append_pair("hl", "en")
            .append_pair("api_key", &self.api_key);

        Ok(url)
    }

    pub async fn search_jobs(
        &self,
        title: &str,
        location: &str,
    ) -> Result<Vec<GoogleJob>, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let url = self.build_url(title, location)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let jobs = parse_google_jobs(&body)?;
        debug!(count = jobs.len(), "SerpApi returned job results");
        Ok(jobs)
    }
}

pub fn parse_google_jobs(body: &str) -> Result<Vec<GoogleJob>, ProviderError> {
    let parsed: GoogleJobsResponse = serde_json::from_str(body)?;

    match parsed.error {
        Some(message) if message.contains(NO_RESULTS_MARKER) => Ok(Vec::new()),
        Some(message) => Err(ProviderError::Upstream(message)),
        None => Ok(parsed.jobs_results),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SerpApiClient {
        SerpApiClient::with_shared_client(Client::new(), SERPAPI_SEARCH_URL, "secret")
    }

    #[test]
    fn test_build_url_with_location() {
        let url = client().build_url("Rust Developer", "Berlin").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("engine".to_string(), "google_jobs".to_string())));
        assert!(pairs.contains(&("q".to_string(), "Rust Developer jobs in Berlin".to_string())));
        assert!(pairs.contains(&("api_key".to_string(), "secret".to_string())));
    }

    #[test]
    fn test_build_url_without_location() {
        let url = client().build_url("Data Analyst", "").unwrap();
        assert!(
            url.query_pairs()
                .any(|(k, v)| k == "q" && v == "Data Analyst")
        );
    }

    #[test]
    fn test_parse_google_jobs() {
        let body = r#"{
            "jobs_results": [{
                "job_id": "abc",
                "title": "Backend Engineer",
                "company_name": "Initech",
                "location": "Austin, TX",
                "description": "Build APIs",
                "job_highlights": [
                    {"title": "Qualifications", "items": ["3+ years Rust", "SQL"]},
                    {"title": "Benefits", "items": ["Dental"]}
                ],
                "detected_extensions": {"posted_at": "2 days ago", "schedule_type": "Full-time"},
                "apply_options": [{"title": "Indeed", "link": "https://www.indeed.com/viewjob?jk=1"}]
            }]
        }"#;

        let jobs = parse_google_jobs(body).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(
            jobs[0].primary_apply_link(),
            Some("https://www.indeed.com/viewjob?jk=1")
        );
        assert_eq!(jobs[0].qualifications(), vec!["3+ years Rust", "SQL"]);
        assert_eq!(
            jobs[0].detected_extensions.schedule_type.as_deref(),
            Some("Full-time")
        );
    }

    #[test]
    fn test_parse_no_results_is_empty() {
        let body = r#"{"error": "Google hasn't returned any results for this query."}"#;
        assert!(parse_google_jobs(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_upstream_error() {
        let body = r#"{"error": "Invalid API key."}"#;
        assert!(matches!(
            parse_google_jobs(body),
            Err(ProviderError::Upstream(msg)) if msg == "Invalid API key."
        ));
        assert!(matches!(
            parse_google_jobs("not json"),
            Err(ProviderError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = SerpApiClient::with_shared_client(Client::new(), SERPAPI_SEARCH_URL, " ");
        assert!(matches!(
            client.search_jobs("Rust", "").await,
            Err(ProviderError::MissingApiKey)
        ));
    }
}
